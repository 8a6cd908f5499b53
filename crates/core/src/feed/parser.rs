use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::types::{FeedVideo, ParsedFeed};
use super::FeedError;

/// Parse a YouTube channel Atom feed from raw XML bytes.
///
/// Entries without a video ID are dropped.
pub fn parse_youtube_feed(xml: &[u8]) -> Result<ParsedFeed, FeedError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut feed = ParsedFeed::default();
    let mut buf = Vec::new();

    // Element names from the root down to the current element.
    let mut path: Vec<String> = Vec::new();
    let mut current_entry: Option<FeedVideoBuilder> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                if name == "entry" {
                    current_entry = Some(FeedVideoBuilder::default());
                }
                if let Some(ref mut entry) = current_entry {
                    entry.capture_thumbnail(&name, &e)?;
                }
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = element_name(&e);
                if let Some(ref mut entry) = current_entry {
                    entry.capture_thumbnail(&name, &e)?;
                }
            }
            Ok(Event::End(_)) => {
                if path.pop().as_deref() == Some("entry") {
                    if let Some(video) = current_entry.take().and_then(FeedVideoBuilder::build) {
                        feed.videos.push(video);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| FeedError::Parse(format!("Bad text content: {}", e)))?
                    .to_string();
                if !text.is_empty() {
                    match (current_entry.as_mut(), parent_and_leaf(&path)) {
                        (Some(entry), Some(("entry", "title"))) => entry.title = Some(text),
                        (Some(entry), Some(("entry", "yt:videoId"))) => {
                            entry.video_id = Some(text)
                        }
                        (Some(entry), Some(("entry", "published"))) => {
                            entry.published = Some(text)
                        }
                        (None, Some(("feed", "title"))) => feed.title = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FeedError::Parse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(feed)
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

fn parent_and_leaf(path: &[String]) -> Option<(&str, &str)> {
    match path {
        [.., parent, leaf] => Some((parent.as_str(), leaf.as_str())),
        _ => None,
    }
}

#[derive(Default)]
struct FeedVideoBuilder {
    video_id: Option<String>,
    title: Option<String>,
    published: Option<String>,
    thumbnail: Option<String>,
}

impl FeedVideoBuilder {
    fn capture_thumbnail(&mut self, name: &str, e: &BytesStart<'_>) -> Result<(), FeedError> {
        if name != "media:thumbnail" || self.thumbnail.is_some() {
            return Ok(());
        }

        for attr in e.attributes() {
            let attr = attr.map_err(|e| FeedError::Parse(format!("Bad attribute: {}", e)))?;
            if attr.key.as_ref() == b"url" {
                let url = attr
                    .unescape_value()
                    .map_err(|e| FeedError::Parse(format!("Bad attribute value: {}", e)))?;
                self.thumbnail = Some(url.to_string());
            }
        }
        Ok(())
    }

    fn build(self) -> Option<FeedVideo> {
        Some(FeedVideo {
            video_id: self.video_id?,
            title: self.title.unwrap_or_default(),
            published: self.published.unwrap_or_default(),
            thumbnail: self.thumbnail,
        })
    }
}
