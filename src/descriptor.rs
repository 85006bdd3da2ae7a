//! The subset of
//! [plugin.proto](https://github.com/protocolbuffers/protobuf/blob/main/src/google/protobuf/compiler/plugin.proto)
//! and
//! [descriptor.proto](https://github.com/protocolbuffers/protobuf/blob/main/src/google/protobuf/descriptor.proto)
//! read by the plugin.
//!
//! Fields which the plugin never looks at are not declared and are skipped
//! during decoding. The exception is [`MethodOptions`], which keeps every
//! field it does not declare so that custom method options survive decoding.

use bytes::{Buf, BufMut};
use prost::encoding::{self, DecodeContext, WireType};
use prost::DecodeError;

/// An encoded `CodeGeneratorRequest` is written to the plugin's stdin.
#[derive(Clone, PartialEq, prost::Message)]
pub struct CodeGeneratorRequest {
    /// The .proto files that were explicitly listed on the command-line. The
    /// code generator should generate code only for these files.
    #[prost(string, repeated, tag = "1")]
    pub file_to_generate: Vec<String>,
    /// The generator parameter passed on the command-line.
    #[prost(string, optional, tag = "2")]
    pub parameter: Option<String>,
    /// FileDescriptorProtos for all files in `file_to_generate` and everything
    /// they import, in topological order.
    #[prost(message, repeated, tag = "15")]
    pub proto_file: Vec<FileDescriptorProto>,
}

/// Describes a complete .proto file.
#[derive(Clone, PartialEq, prost::Message)]
pub struct FileDescriptorProto {
    /// File name, relative to root of source tree.
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    /// e.g. "foo", "foo.bar", etc.
    #[prost(string, optional, tag = "2")]
    pub package: Option<String>,
    #[prost(message, repeated, tag = "6")]
    pub service: Vec<ServiceDescriptorProto>,
    #[prost(message, optional, tag = "8")]
    pub options: Option<FileOptions>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FileOptions {
    /// The Go import path, optionally followed by `;` and the package name.
    #[prost(string, optional, tag = "11")]
    pub go_package: Option<String>,
}

/// Describes a service.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ServiceDescriptorProto {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(message, repeated, tag = "2")]
    pub method: Vec<MethodDescriptorProto>,
}

/// Describes a method of a service.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MethodDescriptorProto {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    /// Input and output type names. These are resolved in the same way as
    /// FieldDescriptorProto.type_name, but must refer to a message type.
    #[prost(string, optional, tag = "2")]
    pub input_type: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub output_type: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub options: Option<MethodOptions>,
}

impl MethodDescriptorProto {
    /// The method's unrecognised option fields, or an empty slice if the
    /// method declares no options.
    pub fn unknown_options(&self) -> &[u8] {
        self.options
            .as_ref()
            .map(|options| options.unknown_fields.as_slice())
            .unwrap_or_default()
    }
}

/// Options attached to a method.
///
/// Extensions of `google.protobuf.MethodOptions` are not known to this type.
/// They are kept, still wire-encoded and in the order they were read, in
/// `unknown_fields`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodOptions {
    pub deprecated: Option<bool>,
    pub idempotency_level: Option<i32>,
    pub unknown_fields: Vec<u8>,
}

impl MethodOptions {
    const DEPRECATED: u32 = 33;
    const IDEMPOTENCY_LEVEL: u32 = 34;
    const FEATURES: u32 = 35;
    const UNINTERPRETED_OPTION: u32 = 999;

    /// Nesting limit for preserved groups, matching the `prost` decoder.
    const RECURSION_LIMIT: u32 = 100;

    /// Re-encodes a field which is not declared above onto `unknown_fields`.
    fn merge_unknown(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        depth: u32,
    ) -> Result<(), DecodeError> {
        encoding::encode_key(tag, wire_type, &mut self.unknown_fields);
        match wire_type {
            WireType::Varint => {
                let value = encoding::decode_varint(buf)?;
                encoding::encode_varint(value, &mut self.unknown_fields);
            }
            WireType::SixtyFourBit => self.copy_exact(8, buf)?,
            WireType::ThirtyTwoBit => self.copy_exact(4, buf)?,
            WireType::LengthDelimited => {
                let len = encoding::decode_varint(buf)?;
                if len > buf.remaining() as u64 {
                    return Err(DecodeError::new("buffer underflow"));
                }
                encoding::encode_varint(len, &mut self.unknown_fields);
                self.copy_exact(len as usize, buf)?;
            }
            WireType::StartGroup => {
                if depth == 0 {
                    return Err(DecodeError::new("recursion limit reached"));
                }
                loop {
                    let (inner_tag, inner_wire_type) = encoding::decode_key(buf)?;
                    if inner_wire_type == WireType::EndGroup {
                        if inner_tag != tag {
                            return Err(DecodeError::new("unexpected end group tag"));
                        }
                        encoding::encode_key(inner_tag, inner_wire_type, &mut self.unknown_fields);
                        break;
                    }
                    self.merge_unknown(inner_tag, inner_wire_type, buf, depth - 1)?;
                }
            }
            WireType::EndGroup => return Err(DecodeError::new("unexpected end group tag")),
        }
        Ok(())
    }

    fn copy_exact(&mut self, len: usize, buf: &mut impl Buf) -> Result<(), DecodeError> {
        if buf.remaining() < len {
            return Err(DecodeError::new("buffer underflow"));
        }
        let start = self.unknown_fields.len();
        self.unknown_fields.resize(start + len, 0);
        buf.copy_to_slice(&mut self.unknown_fields[start..]);
        Ok(())
    }
}

impl prost::Message for MethodOptions {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        if let Some(ref value) = self.deprecated {
            encoding::bool::encode(Self::DEPRECATED, value, buf);
        }
        if let Some(ref value) = self.idempotency_level {
            encoding::int32::encode(Self::IDEMPOTENCY_LEVEL, value, buf);
        }
        buf.put_slice(&self.unknown_fields);
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            Self::DEPRECATED => {
                let value = self.deprecated.get_or_insert_with(Default::default);
                encoding::bool::merge(wire_type, value, buf, ctx)
            }
            Self::IDEMPOTENCY_LEVEL => {
                let value = self.idempotency_level.get_or_insert_with(Default::default);
                encoding::int32::merge(wire_type, value, buf, ctx)
            }
            Self::FEATURES | Self::UNINTERPRETED_OPTION => {
                encoding::skip_field(wire_type, tag, buf, ctx)
            }
            _ => self.merge_unknown(tag, wire_type, buf, Self::RECURSION_LIMIT),
        }
    }

    fn encoded_len(&self) -> usize {
        self.deprecated
            .as_ref()
            .map_or(0, |value| encoding::bool::encoded_len(Self::DEPRECATED, value))
            + self.idempotency_level.as_ref().map_or(0, |value| {
                encoding::int32::encoded_len(Self::IDEMPOTENCY_LEVEL, value)
            })
            + self.unknown_fields.len()
    }

    fn clear(&mut self) {
        self.deprecated = None;
        self.idempotency_level = None;
        self.unknown_fields.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use prost::encoding::{encode_key, encode_varint, string};
    use prost::Message;

    #[test]
    fn keeps_unknown_fields_in_wire_order() {
        let mut raw = Vec::new();
        string::encode(50002, &"second".to_owned(), &mut raw);
        encoding::bool::encode(MethodOptions::DEPRECATED, &true, &mut raw);
        string::encode(50001, &"read,write".to_owned(), &mut raw);
        encode_key(50003, WireType::ThirtyTwoBit, &mut raw);
        raw.extend_from_slice(&7u32.to_le_bytes());

        let options = MethodOptions::decode(raw.as_slice()).unwrap();
        assert_eq!(options.deprecated, Some(true));
        assert_eq!(options.idempotency_level, None);

        let mut expected = Vec::new();
        string::encode(50002, &"second".to_owned(), &mut expected);
        string::encode(50001, &"read,write".to_owned(), &mut expected);
        encode_key(50003, WireType::ThirtyTwoBit, &mut expected);
        expected.extend_from_slice(&7u32.to_le_bytes());
        assert_eq!(options.unknown_fields, expected);
    }

    #[test]
    fn drops_interpreted_options() {
        let mut raw = Vec::new();
        encode_key(MethodOptions::UNINTERPRETED_OPTION, WireType::LengthDelimited, &mut raw);
        encode_varint(2, &mut raw);
        raw.extend_from_slice(&[0x08, 0x01]);
        encoding::int32::encode(MethodOptions::IDEMPOTENCY_LEVEL, &2, &mut raw);

        let options = MethodOptions::decode(raw.as_slice()).unwrap();
        assert_eq!(options.idempotency_level, Some(2));
        assert!(options.unknown_fields.is_empty());
    }

    #[test]
    fn keeps_unknown_groups() {
        let mut raw = Vec::new();
        encode_key(60000, WireType::StartGroup, &mut raw);
        encode_key(1, WireType::Varint, &mut raw);
        encode_varint(300, &mut raw);
        encode_key(2, WireType::SixtyFourBit, &mut raw);
        raw.extend_from_slice(&1u64.to_le_bytes());
        encode_key(60000, WireType::EndGroup, &mut raw);

        let options = MethodOptions::decode(raw.as_slice()).unwrap();
        assert_eq!(options.unknown_fields, raw);
    }

    #[test]
    fn rejects_truncated_unknown_field() {
        let mut raw = Vec::new();
        string::encode(50001, &"read".to_owned(), &mut raw);
        raw.pop();
        assert!(MethodOptions::decode(raw.as_slice()).is_err());
    }

    #[test]
    fn encodes_known_fields_then_unknown_fields() {
        let mut unknown_fields = Vec::new();
        string::encode(50001, &"admin".to_owned(), &mut unknown_fields);
        let options = MethodOptions {
            deprecated: Some(false),
            idempotency_level: Some(1),
            unknown_fields,
        };

        let encoded = options.encode_to_vec();
        assert_eq!(encoded.len(), options.encoded_len());
        assert_eq!(MethodOptions::decode(encoded.as_slice()).unwrap(), options);
    }

    #[test]
    fn method_options_survive_request_decoding() {
        let mut unknown_fields = Vec::new();
        string::encode(50001, &"read".to_owned(), &mut unknown_fields);
        let request = CodeGeneratorRequest {
            file_to_generate: vec!["svc.proto".to_owned()],
            parameter: None,
            proto_file: vec![FileDescriptorProto {
                name: Some("svc.proto".to_owned()),
                package: Some("pkg".to_owned()),
                service: vec![ServiceDescriptorProto {
                    name: Some("Svc".to_owned()),
                    method: vec![MethodDescriptorProto {
                        name: Some("Get".to_owned()),
                        options: Some(MethodOptions {
                            unknown_fields: unknown_fields.clone(),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }],
                }],
                options: None,
            }],
        };

        let decoded = CodeGeneratorRequest::decode(request.encode_to_vec().as_slice()).unwrap();
        let method = &decoded.proto_file[0].service[0].method[0];
        assert_eq!(method.unknown_options(), unknown_fields.as_slice());
        assert!(MethodDescriptorProto::default().unknown_options().is_empty());
    }
}
