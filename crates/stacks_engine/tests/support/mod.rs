#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use scraper::Selector;
use stacks_engine::{NotificationId, NotificationSink};
use stacks_core::Notification;

pub const ID_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const ID_B: &str = "0123456789abcdef0123456789abcdef";
pub const ID_C: &str = "ffffffffffffffffffffffffffffffff";
pub const SEARCH_URL: &str = "https://annas-archive.org/search?q=rust";

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(agent_logging::initialize_for_tests);
}

pub fn save_link() -> &'static str {
    r##"<a href="#" class="custom-a"><span class="icon-[mdi--bookmark-outline]"></span>Save</a>"##
}

/// One search result shaped like the host's markup.
pub fn result_row(id: &str) -> String {
    format!(
        r##"<div class="flex pt-3 pb-3 border-b">
  <a href="/md5/{id}" class="js-vim-focus custom-a">Title {id}</a>
  <div class="text-gray-800 text-sm">en, pdf · <a href="#" class="custom-a"><span class="icon-[mdi--share]"></span>Share</a> · {save}</div>
</div>"##,
        save = save_link()
    )
}

pub fn row_without_save(id: &str) -> String {
    format!(
        r##"<div class="flex pt-3 pb-3 border-b">
  <a href="/md5/{id}" class="js-vim-focus custom-a">Title {id}</a>
  <div class="text-gray-800"><a href="#" class="custom-a">Share</a></div>
</div>"##
    )
}

pub fn row_without_id() -> String {
    format!(
        r##"<div class="flex pt-3 pb-3 border-b">
  <a href="/datasets/other" class="js-vim-focus custom-a">Not an item</a>
  <div class="text-gray-800">{save}</div>
</div>"##,
        save = save_link()
    )
}

pub fn search_page(rows: &[String]) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>Search</title></head><body><div class="js-results">{}</div></body></html>"#,
        rows.join("\n")
    )
}

pub fn detail_page() -> String {
    format!(
        r#"<!DOCTYPE html><html><body><main><h1>Some book</h1><div class="actions">{save}</div></main></body></html>"#,
        save = save_link()
    )
}

pub fn detail_url(id: &str) -> String {
    format!("https://annas-archive.org/md5/{id}")
}

pub fn selector(raw: &str) -> Selector {
    Selector::parse(raw).unwrap()
}

pub fn control_selector() -> Selector {
    selector("[data-stacks-control]")
}

#[derive(Default)]
pub struct RecordingSink {
    pub shown: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn show(&self, _id: NotificationId, notification: &Notification) {
        self.shown.lock().unwrap().push(notification.clone());
    }

    fn dismiss(&self, _id: NotificationId) {}
}
