//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

/// Stack directory that launches a local Multipass virtual machine.
pub const LOCAL_MULTIPASS_DIR: &str = "stacks/local-multipass-vm";

/// Stack directory that provisions an OCI compute instance.
pub const OCI_VM_DIR: &str = "stacks/oci-vm";

/// Stack directory that stands up a local MicroK8s cluster.
pub const LOCAL_MICROK8S_DIR: &str = "stacks/local-microk8s";

/// Every bundled stack directory, in scan order.
pub const ALL_STACK_DIRS: [&str; 3] = [LOCAL_MICROK8S_DIR, LOCAL_MULTIPASS_DIR, OCI_VM_DIR];
