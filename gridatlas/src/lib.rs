//! GridAtlas - Map tile pyramid generation for virtual-world region grids
//!
//! This library renders a grid of square world regions into a hierarchical
//! pyramid of map tiles: one image per region at the base zoom level, then
//! recursively composited 2x2 into coarser zoom levels, slippy-map style.
//!
//! # High-Level API
//!
//! For most use cases, construct a [`generator::PyramidGenerator`] from the
//! three collaborator seams and run one generation cycle:
//!
//! ```ignore
//! use gridatlas::config::GeneratorConfig;
//! use gridatlas::directory::StaticRegionDirectory;
//! use gridatlas::generator::PyramidGenerator;
//! use gridatlas::render::FlatColorRenderer;
//! use gridatlas::store::DiskTileStore;
//! use std::sync::Arc;
//!
//! let directory = Arc::new(StaticRegionDirectory::new(regions));
//! let renderer = Arc::new(FlatColorRenderer::new());
//! let store = Arc::new(DiskTileStore::new("tiles".into(), config.format)?);
//!
//! let generator = PyramidGenerator::new(directory, renderer, store, config);
//! let report = generator.run_cycle()?;
//! ```
//!
//! # Architecture
//!
//! - [`config`] - generation cycle settings
//! - [`coord`] - grid/tile coordinate model and node identity
//! - [`tree`] - quadtree construction from leaf region coordinates
//! - [`compositor`] - post-order compositing traversal (render, downsample, persist)
//! - [`directory`] - region directory seam (who exists, and where)
//! - [`render`] - per-region renderer seam and placeholder generation
//! - [`store`] - tile persistence seam with disk and in-memory backends
//! - [`generator`] - one generation cycle: build tree, composite, clean up

pub mod compositor;
pub mod config;
pub mod coord;
pub mod directory;
pub mod generator;
pub mod logging;
pub mod render;
pub mod store;
pub mod tree;

/// Version of the GridAtlas library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
