//! HTTP route handlers for the bookstore API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (DB ping)
//!
//! # Auth
//! POST /api/auth/register              - Create an account
//! POST /api/auth/login                 - Issue a bearer token
//! GET  /api/auth/me                    - Current user
//!
//! # Catalog (public)
//! GET  /api/books                      - List/filter/sort books
//! GET  /api/books/{book_id}            - Book detail
//! GET  /api/dicts/genres               - Genre dictionary
//! GET  /api/dicts/authors              - Author dictionary
//! GET  /api/dicts/publishers           - Publisher dictionary
//!
//! # Catalog (admin)
//! POST   /api/books                    - Create book
//! PUT    /api/books/{book_id}          - Partial update
//! DELETE /api/books/{book_id}          - Delete book
//!
//! # Cart (requires auth)
//! GET    /api/cart                     - Current cart (created lazily)
//! POST   /api/cart/items               - Add item (merge-on-add)
//! PATCH  /api/cart/items/{item_id}     - Set quantity
//! DELETE /api/cart/items/{item_id}     - Remove item
//! DELETE /api/cart                     - Clear cart
//!
//! # Orders (requires auth)
//! POST /api/orders                     - Checkout
//! GET  /api/orders                     - Own orders
//! GET  /api/orders/{order_id}          - Own order detail
//!
//! # Profile (requires auth)
//! GET  /api/users/me                   - Profile with addresses
//! PUT  /api/users/me                   - Update profile
//! POST /api/users/me/password          - Change password
//! GET    /api/users/me/addresses       - List addresses
//! POST   /api/users/me/addresses       - Create address
//! PUT    /api/users/me/addresses/{id}  - Update address
//! DELETE /api/users/me/addresses/{id}  - Delete address
//!
//! # Admin panel (requires admin)
//! /api/admin/genres, /api/admin/authors, /api/admin/publishers  - CRUD
//! GET   /api/admin/users               - List users
//! PATCH /api/admin/users/{user_id}     - Toggle admin flag
//! GET   /api/admin/orders              - All orders
//! GET   /api/admin/orders/{order_id}   - Order detail
//! PATCH /api/admin/orders/{order_id}/status      - Set status
//! POST  /api/admin/books/{book_id}/cover         - Upload cover (base64)
//! ```

pub mod admin;
pub mod auth;
pub mod books;
pub mod cart;
pub mod dicts;
pub mod orders;
pub mod users;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Create the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/books", book_routes())
        .nest("/dicts", dict_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/users", user_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
}

fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(books::list).post(books::create))
        .route(
            "/{book_id}",
            get(books::get).put(books::update).delete(books::remove),
        )
}

fn dict_routes() -> Router<AppState> {
    Router::new()
        .route("/genres", get(dicts::list_genres))
        .route("/authors", get(dicts::list_authors))
        .route("/publishers", get(dicts::list_publishers))
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{item_id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::checkout).get(orders::list))
        .route("/{order_id}", get(orders::get))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::profile).put(users::update_profile))
        .route("/me/password", post(users::change_password))
        .route(
            "/me/addresses",
            get(users::list_addresses).post(users::create_address),
        )
        .route(
            "/me/addresses/{address_id}",
            put(users::update_address).delete(users::delete_address),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/genres", get(admin::list_genres).post(admin::create_genre))
        .route(
            "/genres/{genre_id}",
            put(admin::update_genre).delete(admin::delete_genre),
        )
        .route(
            "/authors",
            get(admin::list_authors).post(admin::create_author),
        )
        .route(
            "/authors/{author_id}",
            put(admin::update_author).delete(admin::delete_author),
        )
        .route(
            "/publishers",
            get(admin::list_publishers).post(admin::create_publisher),
        )
        .route(
            "/publishers/{publisher_id}",
            put(admin::update_publisher).delete(admin::delete_publisher),
        )
        .route("/users", get(admin::list_users))
        .route("/users/{user_id}", patch(admin::update_user))
        .route("/orders", get(admin::list_orders))
        .route("/orders/{order_id}", get(admin::get_order))
        .route("/orders/{order_id}/status", patch(admin::update_order_status))
        .route("/books/{book_id}/cover", post(admin::upload_book_cover))
}
