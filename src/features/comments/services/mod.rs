pub mod comment_service;

pub use comment_service::CommentService;
