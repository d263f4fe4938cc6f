//! List registered operations.

use portbridge_core::operations::standard_registry;

/// Run the operations command.
pub fn run() {
    for operation in standard_registry().iter() {
        println!("{}", operation.signature());
    }
}
