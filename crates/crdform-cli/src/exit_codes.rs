//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - state does not match the resource schema
pub const VALIDATION_ERROR: i32 = 2;

/// Schema error - invalid CRD document
pub const SCHEMA_ERROR: i32 = 3;

/// Cluster error - API failure, missing kubeconfig, or offline refusal
pub const CLUSTER_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
