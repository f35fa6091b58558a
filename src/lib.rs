//! # Quill
//!
//! `quill` is a minimal blogging application skeleton: user registration and
//! login over HTTP, server-rendered pages, signed cookie sessions, SQLite
//! storage.
//!
//! ## Sessions
//!
//! The session is a tamper-evident cookie `session=<user_id>.<signature>`
//! signed with HMAC-SHA256. A router middleware resolves the cookie into a
//! [`session::CurrentUser`] request-context value once per request; a
//! malformed or forged cookie degrades to anonymous, it is never surfaced.
//!
//! ## Passwords
//!
//! Passwords are stored as scrypt PHC strings (N=32768, r=8, p=1) with a
//! fresh random salt per hash. Verification recomputes with the parameters
//! embedded in the stored string and compares in constant time.
//!
//! ## Storage
//!
//! One `sqlx` SQLite pool per process; each request acquires a single
//! connection and the pool guard releases it on every exit path. Duplicate
//! usernames are rejected by the store's unique index, not by an
//! application-level pre-check.

pub mod auth;
pub mod cli;
pub mod db;
pub mod quill;
pub mod session;
