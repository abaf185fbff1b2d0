//! almanac - MCP tool server for a knowledge-base backend
//!
//! This library provides:
//! - `backend`: HTTP gateway to the knowledge-base service
//! - `schemas`: input schema declarations for each tool
//! - `tools`: the tool catalogue and registry construction
//! - `serve`: HTTP server (MCP, manifest, health)
//! - `telemetry`: tracing and OpenTelemetry setup
//! - `commands`: CLI subcommands

pub mod backend;
pub mod commands;
pub mod schemas;
pub mod serve;
pub mod telemetry;
pub mod tools;
