//! Tag reading

use chrono::{TimeZone, Utc};
use tracing::{debug, instrument, warn};

use crate::repository::{GitRepo, Result};
use crate::types::TagInfo;

impl GitRepo {
    /// Get all tags in reference order.
    ///
    /// Annotated tags resolve to the commit they point at. Tags that point at
    /// non-commit objects are left out.
    #[instrument(skip(self))]
    pub fn tags(&self) -> Result<Vec<TagInfo>> {
        let mut tags = Vec::new();

        self.repo.tag_foreach(|oid, name| {
            let name = String::from_utf8_lossy(name)
                .trim_start_matches("refs/tags/")
                .to_string();

            if let Ok(commit) = self.repo.find_commit(oid) {
                tags.push(TagInfo::new(&name, commit.id().to_string()));
            } else if let Ok(tag) = self.repo.find_tag(oid) {
                let Ok(target) = tag.target().and_then(|t| t.peel_to_commit()) else {
                    warn!(tag = %name, "tag does not point at a commit, ignoring");
                    return true;
                };
                let mut tag_info = TagInfo::new(&name, target.id().to_string());

                if let Some(msg) = tag.message() {
                    tag_info = tag_info.with_message(msg.trim());
                }

                if let Some(tagger) = tag.tagger() {
                    if let Some(name) = tagger.name() {
                        tag_info = tag_info.with_tagger(name);
                    }
                    if let Some(timestamp) = Utc.timestamp_opt(tagger.when().seconds(), 0).single()
                    {
                        tag_info = tag_info.with_timestamp(timestamp);
                    }
                }

                tags.push(tag_info);
            }

            true
        })?;

        debug!(count = tags.len(), "listed all tags");
        Ok(tags)
    }
}
