/// Business logic layer
///
/// One service per domain module. Services hold a `PgPool` (plus any
/// collaborators injected at construction), run their own SQL, and return
/// `Result<T, AppError>`; handlers only translate between HTTP and these
/// calls.
pub mod auth;
pub mod comments;
pub mod friend_requests;
pub mod friendships;
pub mod likes;
pub mod media;
pub mod posts;
pub mod profiles;

pub use auth::AuthService;
pub use comments::CommentService;
pub use friend_requests::FriendRequestService;
pub use friendships::FriendshipService;
pub use likes::LikeService;
pub use media::MediaService;
pub use posts::PostService;
pub use profiles::ProfileService;
