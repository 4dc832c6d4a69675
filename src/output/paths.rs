//! Partitioned output paths

use chrono::{NaiveDate, Utc};

/// Make a stream name safe as a directory name
pub fn sanitize_stream_name(stream_name: &str) -> String {
    stream_name.replace(['.', '/', '\\'], "_")
}

/// Build a Hive-style partitioned path for an output file
///
/// Format: `{stream}/dt={YYYY-MM-DD}/data.{ext}`
pub fn build_partitioned_path(stream_name: &str, extension: &str) -> String {
    format!(
        "{}/dt={}/data.{extension}",
        sanitize_stream_name(stream_name),
        today()
    )
}

/// Build a partitioned directory path (without filename)
///
/// Format: `{base_path}/{stream}/dt={YYYY-MM-DD}`
pub fn build_partitioned_dir(base_path: &str, stream_name: &str) -> String {
    partitioned_dir_for(base_path, stream_name, today())
}

pub(crate) fn partitioned_dir_for(base_path: &str, stream_name: &str, date: NaiveDate) -> String {
    format!(
        "{}/{}/dt={}",
        base_path.trim_end_matches('/'),
        sanitize_stream_name(stream_name),
        date.format("%Y-%m-%d")
    )
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
