//! # Sourcelink Library
//!
//! This library resolves external *references* (identifiers pointing at
//! remotely or locally hosted content such as repositories, commits,
//! subdirectories, and downloadable files) to local filesystem paths, and
//! layers a *module dependency resolver* on top that maps named modules
//! declared in manifests onto those resolved paths through a shared,
//! deduplicated namespace.
//!
//! ## Quick Example
//!
//! ```no_run
//! use sourcelink::resolver::ReferenceResolver;
//!
//! let resolver = ReferenceResolver::new("/var/cache/sourcelink");
//!
//! // Resolve a subdirectory of a repository at a branch; the result is a
//! // path into the commit-addressed content cache.
//! let path = resolver
//!     .resolve("git+https://example.com/org/tools@main/bash")
//!     .unwrap();
//! assert!(path.exists());
//! ```
//!
//! ## Core Concepts
//!
//! The library is built around a few key concepts:
//!
//! - **Source References (`reference`)**: Typed descriptors parsed from raw
//!   reference strings, one variant per origin scheme (git repository,
//!   absolute path, http endpoint, generic object store).
//! - **Content Cache (`cache`)**: An on-disk content-addressable store keyed
//!   by commit hash or normalized-URL hash. Entries are created once via an
//!   atomic write-then-rename publish and never mutated or evicted.
//! - **Reference Resolution (`resolver`, `git`, `fetch`)**: Turns a
//!   reference into a materialized local path, contacting the origin only on
//!   a cache miss.
//! - **Module Dependencies (`manifest`, `modules`)**: Reads declarative
//!   manifests and wires each declared module into a per-namespace symlink
//!   tree pointing at the shared cache, so identical content is fetched and
//!   stored once no matter how many manifests reference it.
//!
//! ## Execution Flow
//!
//! Resolving a manifest proceeds module by module:
//!
//! 1.  **Parse** the manifest and collect declared modules across sections.
//! 2.  **Look up** each module's commit via a lightweight remote listing.
//! 3.  **Fetch** on a cache miss: shallow-clone into the commit-keyed slot.
//! 4.  **Link** the module into `modules/{namespace}/{module_id}`.
//!
//! Failures are isolated per module; a single broken dependency never
//! blocks resolution of its siblings.
//!
//! All operations are synchronous, blocking calls. The engine defines no
//! internal scheduler; callers embedded in an async host are expected to
//! offload resolution to a blocking-friendly execution context.

pub mod cache;
pub mod defaults;
pub mod error;
pub mod fetch;
pub mod git;
pub mod manifest;
pub mod modules;
pub mod reference;
pub mod resolver;

#[cfg(test)]
mod reference_proptest;
