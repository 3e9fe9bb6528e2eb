pub mod extract_url;
pub mod media_delete;
pub mod media_get;
pub mod media_list;
pub mod upload;
