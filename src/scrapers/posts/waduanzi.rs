//! WaDuanZi (waduanzi.com) HTML listing.

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::PostAdapter;
use crate::error::ScrapeError;
use crate::models::Post;
use crate::scrapers::extract::{non_empty, parse_count, section_selector, Descriptor, FieldRule};
use crate::scrapers::http_client::{Download, HttpClient, Payload};

const SITE: &str = "挖段子";

#[derive(Debug, Clone)]
pub struct WaDuanZi {
    sections: Selector,
    title: FieldRule,
    content: FieldRule,
    author: FieldRule,
    avatar: FieldRule,
    like_count: FieldRule,
    dislike_count: FieldRule,
}

impl WaDuanZi {
    pub fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            sections: section_selector("div.post-item")?,
            title: FieldRule::text(Descriptor::select("h2.item-title > a"))?,
            content: FieldRule::text(Descriptor::select("div.item-content"))?,
            author: FieldRule::text(Descriptor::select("div.post-author > a"))?,
            avatar: FieldRule::attr(Descriptor::select("div.post-author > img"), "src")?,
            like_count: FieldRule::text(Descriptor::select(
                "div.item-toolbar > ul > li:nth-of-type(1) > a",
            ))?,
            dislike_count: FieldRule::text(Descriptor::select(
                "div.item-toolbar > ul > li:nth-of-type(2) > a",
            ))?,
        })
    }

    pub fn scrape(&self, html: &str) -> Vec<Post> {
        let document = Html::parse_document(html);
        document
            .select(&self.sections)
            .map(|section| {
                let mut post = Post::new(SITE, self.content.extract(section));
                post.title = non_empty(self.title.extract(section));
                post.author = non_empty(self.author.extract(section));
                post.avatar = non_empty(self.avatar.extract(section));
                post.like_count = parse_count(&self.like_count.extract(section));
                // The site renders dislikes as negative numbers
                post.dislike_count =
                    parse_count(&self.dislike_count.extract(section)).saturating_abs();
                post
            })
            .collect()
    }
}

#[async_trait]
impl PostAdapter for WaDuanZi {
    fn name(&self) -> &'static str {
        "WaDuanZi"
    }

    fn download(&self) -> Download {
        Download::html()
    }

    async fn parse(
        &self,
        _client: &HttpClient,
        url: &str,
        payload: Payload,
    ) -> Result<Vec<Post>, ScrapeError> {
        Ok(self.scrape(&payload.into_html(url)?))
    }
}
