use rand::Rng;

/// Where a quote for the current request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSource {
    Local,
    Remote,
}

/// Decides the source of each served quote.
pub trait SourcePicker: Send + Sync {
    fn choose(&self) -> QuoteSource;
}

/// Biased coin: `Remote` with probability `remote_probability`.
#[derive(Debug, Clone, Copy)]
pub struct CoinFlip {
    remote_probability: f64,
}

impl CoinFlip {
    pub fn new(remote_probability: f64) -> Self {
        let remote_probability = if remote_probability.is_nan() {
            0.5
        } else {
            remote_probability.clamp(0.0, 1.0)
        };
        Self { remote_probability }
    }

    pub fn fair() -> Self {
        Self::new(0.5)
    }

    pub fn remote_probability(&self) -> f64 {
        self.remote_probability
    }
}

impl SourcePicker for CoinFlip {
    fn choose(&self) -> QuoteSource {
        if rand::thread_rng().gen_bool(self.remote_probability) {
            QuoteSource::Remote
        } else {
            QuoteSource::Local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certain_coins_are_deterministic() {
        let never = CoinFlip::new(0.0);
        let always = CoinFlip::new(1.0);
        for _ in 0..100 {
            assert_eq!(never.choose(), QuoteSource::Local);
            assert_eq!(always.choose(), QuoteSource::Remote);
        }
    }

    #[test]
    fn probability_is_clamped() {
        assert_eq!(CoinFlip::new(-3.0).remote_probability(), 0.0);
        assert_eq!(CoinFlip::new(7.5).remote_probability(), 1.0);
        assert_eq!(CoinFlip::new(f64::NAN).remote_probability(), 0.5);
    }

    #[test]
    fn fair_coin_lands_on_both_sides() {
        let coin = CoinFlip::fair();
        let remote = (0..1000)
            .filter(|_| coin.choose() == QuoteSource::Remote)
            .count();
        assert!((300..700).contains(&remote), "remote picks: {remote}");
    }
}
