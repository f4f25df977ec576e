//! Container actions. Currently only metadata tagging.

mod tag;

pub use tag::{tag_args, write_tags, TagSet};
