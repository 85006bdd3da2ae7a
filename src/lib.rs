//! `protoc-gen-permissions` is a `protoc` plugin which turns per-method permission
//! annotations into a Go lookup table and gRPC server interceptors.
//!
//! ## Annotating methods
//!
//! Permissions are declared with a custom `MethodOptions` extension holding a
//! comma separated list:
//!
//! ```proto
//! syntax = "proto3";
//!
//! package acme.billing.v1;
//!
//! import "google/protobuf/descriptor.proto";
//!
//! option go_package = "example.com/acme/billing/v1;billingv1";
//!
//! extend google.protobuf.MethodOptions {
//!   string required_permissions = 50001;
//! }
//!
//! service Invoices {
//!   rpc Get(GetRequest) returns (Invoice) {
//!     option (required_permissions) = "invoices.read";
//!   }
//!   rpc Void(VoidRequest) returns (Invoice) {
//!     option (required_permissions) = "invoices.read,invoices.write";
//!   }
//! }
//! ```
//!
//! Running `protoc --permissions_out=. billing.proto` writes
//! `example.com/acme/billing/v1/billing_permissions.pb.go`, containing:
//!
//! ```go
//! var requiredPermissions = map[string][]string{
//!     "/acme.billing.v1.Invoices/Get": { "invoices.read", },
//!     "/acme.billing.v1.Invoices/Void": { "invoices.read", "invoices.write", },
//! }
//! ```
//!
//! followed by `UnaryServerInterceptor` and `StreamServerInterceptor`
//! constructors which consult that table.
//!
//! ## Plugin parameters
//!
//! See [`Config::from_parameter`]. The extension field number defaults to
//! [`DEFAULT_EXTENSION_FIELD_NUMBER`] and can be changed with
//! `--permissions_opt=extension-field-number=N`.
//!
//! ## How the annotation is found
//!
//! The extension is not registered with the descriptor types, so its value
//! arrives among the unrecognised fields of each method's options. Those
//! fields are kept as raw bytes by [`descriptor::MethodOptions`] and scanned
//! directly by [`wire::extract_string`].

use log::debug;
use prost_types::compiler::{code_generator_response, CodeGeneratorResponse};

mod code_generator;
mod config;
pub mod descriptor;
mod error;
mod ident;
mod options;
mod table;
pub mod wire;

pub use crate::code_generator::{emit, generate_file, output_file_name, permissions_map};
pub use crate::config::{Config, PathMode, DEFAULT_EXTENSION_FIELD_NUMBER};
pub use crate::error::Error;
pub use crate::options::{extract_permissions, PERMISSION_DELIMITER};
pub use crate::table::{method_full_name, MethodPermissions, PermissionTable};

use crate::descriptor::CodeGeneratorRequest;

/// Runs the plugin over a decoded request.
///
/// Any failure, whether from the plugin parameter or from naming an output
/// file, is reported through the response's `error` field and no files are
/// returned.
pub fn compile_request(request: CodeGeneratorRequest) -> CodeGeneratorResponse {
    let supported_features = Some(code_generator_response::Feature::Proto3Optional as u64);
    match generate(&request) {
        Ok(file) => CodeGeneratorResponse {
            supported_features,
            file,
            ..Default::default()
        },
        Err(error) => CodeGeneratorResponse {
            error: Some(error.to_string()),
            supported_features,
            ..Default::default()
        },
    }
}

/// Generates a permissions file for each requested `.proto` file declaring at
/// least one service, in request order.
pub fn generate(
    request: &CodeGeneratorRequest,
) -> Result<Vec<code_generator_response::File>, Error> {
    let config = Config::from_parameter(request.parameter.as_deref())?;

    let mut files = Vec::new();
    for file in &request.proto_file {
        if !request.file_to_generate.iter().any(|name| name == file.name()) {
            debug!("file: {:?} is a dependency, skipping", file.name());
            continue;
        }
        files.extend(generate_file(&config, file)?);
    }
    Ok(files)
}
