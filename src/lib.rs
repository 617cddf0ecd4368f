//! # reelsync
//!
//! A batch importer for conference session videos.
//!
//! reelsync reads a CSV manifest describing recorded sessions, idempotently
//! uploads each referenced video file to an object-storage bucket, and
//! upserts a published record per session in a CMS, grouped into a
//! root → conference → section category chain.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌───────────────┐   ┌──────────┐
//! │   CSV    │──▶│  Classify  │──▶│ ensure_stored │──▶│  Upsert  │
//! │ manifest │   │  Sect/Row  │   │  (S3 bucket)  │   │  (CMS)   │
//! └──────────┘   └────────────┘   └───────────────┘   └──────────┘
//! ```
//!
//! One row is fully processed (download, upload, upsert, metadata) before
//! the next begins; repeated imports of the same manifest update records in
//! place and skip already-stored objects.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`rows`] | CSV row classification |
//! | [`slug`] | Slug and storage-key derivation |
//! | [`markup`] | Video embed markup and series tagging |
//! | [`traits`] | Collaborator seams (storage, CMS, fetch) |
//! | [`storage`] | S3 object store (SigV4) |
//! | [`cms`] | WordPress-style REST CMS client |
//! | [`fetch`] | HTTP media fetcher |
//! | [`uploader`] | Idempotent storage upload |
//! | [`import`] | Run driver |

pub mod cms;
pub mod config;
pub mod fetch;
pub mod import;
pub mod markup;
pub mod models;
pub mod rows;
pub mod slug;
pub mod storage;
pub mod traits;
pub mod uploader;
