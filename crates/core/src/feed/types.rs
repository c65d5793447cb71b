use serde::{Deserialize, Serialize};

pub const SUMMARY_MAX_CHARS: usize = 350;
pub const TITLE_PLACEHOLDER: &str = "No Title";

/// One normalized feed entry. Only ever consumed as digest text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub link: String,
}

impl NewsItem {
    pub fn digest_block(&self) -> String {
        format!(
            "Title: {}\nSummary: {}...\nLink: {}\n---\n",
            self.title, self.summary, self.link
        )
    }
}

pub fn render_digest(items: &[NewsItem]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&item.digest_block());
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_joins_blocks_and_trims_trailing_newline() {
        let items = vec![
            NewsItem {
                title: "A".to_string(),
                summary: "first".to_string(),
                link: "https://a".to_string(),
            },
            NewsItem {
                title: "B".to_string(),
                summary: String::new(),
                link: String::new(),
            },
        ];
        assert_eq!(
            render_digest(&items),
            "Title: A\nSummary: first...\nLink: https://a\n---\nTitle: B\nSummary: ...\nLink: \n---"
        );
    }

    #[test]
    fn empty_digest_is_empty_string() {
        assert_eq!(render_digest(&[]), "");
    }
}
