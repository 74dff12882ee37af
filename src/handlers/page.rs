use axum::{extract::State, response::Html};
use html_escape::encode_text;

use crate::db::QuoteView;
use crate::{QuoterError, router::QuoterState};

/// GET / -> HTML page with one random quote.
pub async fn random_quote_page(
    State(state): State<QuoterState>,
) -> Result<Html<String>, QuoterError> {
    let view = state.service.random_quote().await?;
    Ok(Html(render_quote_page(&view)))
}

pub fn render_quote_page(view: &QuoteView) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Random quote</title>
</head>
<body>
<figure class="quote">
<blockquote>{quote}</blockquote>
<figcaption>
<span class="author">{author}</span>
<span class="category">{category}</span>
</figcaption>
</figure>
</body>
</html>
"#,
        quote = encode_text(&view.quote.quote),
        author = encode_text(&view.author.name),
        category = encode_text(&view.category.name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Author, Category, Quote};

    #[test]
    fn page_escapes_every_field() {
        let view = QuoteView {
            quote: Quote {
                id: 1,
                quote: "1 < 2 & <b>bold</b>".into(),
                author_id: 1,
                category_id: 1,
            },
            author: Author {
                id: 1,
                name: "O'Brien <script>".into(),
                birthdate: None,
            },
            category: Category {
                id: 1,
                name: "Math & Logic".into(),
            },
        };
        let page = render_quote_page(&view);
        assert!(page.contains("<blockquote>1 &lt; 2 &amp; &lt;b&gt;bold&lt;/b&gt;</blockquote>"));
        assert!(page.contains(r#"<span class="author">O'Brien &lt;script&gt;</span>"#));
        assert!(page.contains(r#"<span class="category">Math &amp; Logic</span>"#));
        assert!(!page.contains("<script>"));
    }
}
