/// HTTP request handlers and route table
///
/// Handlers stay thin: extract the authenticated user and the payload,
/// call the matching service, wrap the outcome in the response envelope.
pub mod auth;
pub mod comments;
pub mod friend_requests;
pub mod friendships;
pub mod likes;
pub mod media;
pub mod posts;
pub mod profiles;

use crate::middleware::JwtAuthMiddleware;
use actix_web::web;

/// Wire the versioned route table.
///
/// Registration, login and token refresh are the only anonymous routes;
/// everything else sits behind bearer-JWT middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/token/refresh", web::post().to(auth::refresh_token))
                    .service(
                        web::resource("/token/revoke")
                            .route(web::delete().to(auth::revoke_token))
                            .wrap(JwtAuthMiddleware),
                    ),
            )
            .service(
                web::scope("/profiles")
                    .wrap(JwtAuthMiddleware)
                    .service(
                        web::resource("")
                            .route(web::get().to(profiles::get_own_profile))
                            .route(web::put().to(profiles::update_profile)),
                    )
                    .service(
                        web::resource("/{username}").route(web::get().to(profiles::get_profile)),
                    ),
            )
            .service(
                web::scope("/friend-requests")
                    .wrap(JwtAuthMiddleware)
                    .service(
                        web::resource("")
                            .route(web::post().to(friend_requests::send))
                            .route(web::get().to(friend_requests::list)),
                    )
                    .service(
                        web::resource("/{requestId}/approve")
                            .route(web::post().to(friend_requests::approve)),
                    )
                    .service(
                        web::resource("/{requestId}/reject")
                            .route(web::post().to(friend_requests::reject)),
                    ),
            )
            .service(
                web::scope("/friendships")
                    .wrap(JwtAuthMiddleware)
                    .service(
                        web::resource("/followers/{username}")
                            .route(web::get().to(friendships::get_followers)),
                    )
                    .service(
                        web::resource("/followings/{username}")
                            .route(web::get().to(friendships::get_following)),
                    )
                    .service(
                        web::resource("/unfollow/{followeeUsername}")
                            .route(web::delete().to(friendships::unfollow)),
                    ),
            )
            .service(
                web::scope("/posts")
                    .wrap(JwtAuthMiddleware)
                    .service(
                        web::resource("")
                            .route(web::post().to(posts::create_post))
                            .route(web::get().to(posts::get_own_posts)),
                    )
                    .service(
                        web::resource("/{postId}")
                            .route(web::get().to(posts::get_post))
                            .route(web::put().to(posts::update_post))
                            .route(web::delete().to(posts::delete_post)),
                    )
                    .service(
                        web::resource("/{postId}/like")
                            .route(web::post().to(likes::toggle_post_like)),
                    )
                    .service(
                        web::resource("/{postId}/likes").route(web::get().to(likes::post_likers)),
                    )
                    .service(
                        web::resource("/{postId}/comments")
                            .route(web::get().to(comments::get_post_comments)),
                    ),
            )
            .service(
                web::scope("/comments")
                    .wrap(JwtAuthMiddleware)
                    .service(web::resource("").route(web::post().to(comments::add_comment)))
                    .service(
                        web::resource("/{commentId}")
                            .route(web::get().to(comments::get_comment_tree))
                            .route(web::delete().to(comments::delete_comment)),
                    )
                    .service(
                        web::resource("/{commentId}/like")
                            .route(web::post().to(likes::toggle_comment_like)),
                    )
                    .service(
                        web::resource("/{commentId}/likes")
                            .route(web::get().to(likes::comment_likers)),
                    ),
            )
            .service(
                web::scope("/media")
                    .wrap(JwtAuthMiddleware)
                    .service(web::resource("/upload").route(web::post().to(media::upload))),
            ),
    );
}
