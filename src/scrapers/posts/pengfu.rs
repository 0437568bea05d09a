//! PengFu (pengfu.com) HTML listing.

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::PostAdapter;
use crate::error::ScrapeError;
use crate::models::{FetchKey, Post};
use crate::scrapers::extract::{non_empty, parse_count, section_selector, Descriptor, FieldRule};
use crate::scrapers::http_client::{Download, HttpClient, Payload};

const SITE: &str = "捧腹网";

#[derive(Debug, Clone)]
pub struct PengFu {
    sections: Selector,
    id: FieldRule,
    title: FieldRule,
    content: FieldRule,
    author: FieldRule,
    avatar: FieldRule,
    like_count: FieldRule,
    dislike_count: FieldRule,
    comment_count: FieldRule,
}

impl PengFu {
    pub fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            sections: section_selector("div.list-item")?,
            id: FieldRule::own_attr("id"),
            title: FieldRule::text(Descriptor::select("h1.dp-b > a"))?,
            content: FieldRule::text(Descriptor::select("div.content-img"))?,
            author: FieldRule::text(Descriptor::select("p.user_name_list > a"))?,
            avatar: FieldRule::attr(Descriptor::select("a.mem-header > img"), "src")?,
            like_count: FieldRule::text(Descriptor::select("span.ding em"))?,
            dislike_count: FieldRule::text(Descriptor::select("span.cai em"))?,
            comment_count: FieldRule::text(Descriptor::select("span.commentClick em"))?,
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
                post.comment_count = parse_count(&self.comment_count.extract(section));
                post.like_count = parse_count(&self.like_count.extract(section));
                post.dislike_count = parse_count(&self.dislike_count.extract(section));
                post.fetch_key = non_empty(self.id.extract(section)).map(FetchKey::new);
                post
            })
            .collect()
    }
}

#[async_trait]
impl PostAdapter for PengFu {
    fn name(&self) -> &'static str {
        "PengFu"
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
