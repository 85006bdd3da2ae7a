use log::{debug, trace};

use crate::descriptor::FileDescriptorProto;
use crate::options::extract_permissions;

/// The permissions required by a single method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodPermissions {
    /// The gRPC method name, `/package.Service/Method`.
    pub full_name: String,
    /// Required permissions, in annotation order.
    pub permissions: Vec<String>,
}

/// The annotated methods of one `.proto` file, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PermissionTable {
    entries: Vec<MethodPermissions>,
}

impl PermissionTable {
    /// Collects the permission annotations of every method of every service
    /// declared in `file`.
    ///
    /// Services and methods are visited in declaration order. Methods without
    /// an annotation, or with an empty one, are left out.
    pub fn build(file: &FileDescriptorProto, field_number: u32) -> PermissionTable {
        let mut entries = Vec::new();

        for service in &file.service {
            for method in &service.method {
                let full_name = method_full_name(file.package(), service.name(), method.name());
                let permissions = extract_permissions(method.unknown_options(), field_number);
                if permissions.is_empty() {
                    trace!("  method: {:?} has no permissions", full_name);
                    continue;
                }

                debug!("  method: {:?}, permissions: {:?}", full_name, permissions);
                entries.push(MethodPermissions {
                    full_name,
                    permissions,
                });
            }
        }

        PermissionTable { entries }
    }

    /// Iterates over the table's entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &MethodPermissions> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<MethodPermissions> for PermissionTable {
    fn from_iter<I: IntoIterator<Item = MethodPermissions>>(iter: I) -> Self {
        PermissionTable {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Formats the name gRPC uses to address a method.
///
/// A file without a package yields `/Service/Method`.
pub fn method_full_name(package: &str, service: &str, method: &str) -> String {
    if package.is_empty() {
        format!("/{}/{}", service, method)
    } else {
        format!("/{}.{}/{}", package, service, method)
    }
}
