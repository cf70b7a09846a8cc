//! Permission flag sets and their compact wire encodings.
//!
//! Each set serializes one reserved character per granted capability in
//! a fixed canonical order documented by the service; the order is part
//! of the wire contract and differs per resource kind. Parsing accepts
//! characters in any order but rejects anything outside the alphabet.

use std::fmt;
use std::str::FromStr;

use azsign_core::Error;

/// Permissions grantable by a blob service SAS. Encodes as `racwd`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlobSasPermissions {
    /// Read the content, properties and metadata (`r`).
    pub read: bool,
    /// Add a block to an append blob (`a`).
    pub add: bool,
    /// Write a new blob or snapshot (`c`).
    pub create: bool,
    /// Write content, properties and metadata (`w`).
    pub write: bool,
    /// Delete the blob (`d`).
    pub delete: bool,
}

impl fmt::Display for BlobSasPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.read {
            f.write_str("r")?;
        }
        if self.add {
            f.write_str("a")?;
        }
        if self.create {
            f.write_str("c")?;
        }
        if self.write {
            f.write_str("w")?;
        }
        if self.delete {
            f.write_str("d")?;
        }
        Ok(())
    }
}

impl FromStr for BlobSasPermissions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut p = Self::default();
        for c in s.chars() {
            match c {
                'r' => p.read = true,
                'a' => p.add = true,
                'c' => p.create = true,
                'w' => p.write = true,
                'd' => p.delete = true,
                _ => return Err(invalid_permission(c)),
            }
        }
        Ok(p)
    }
}

/// Permissions grantable by a container SAS. Encodes as `racwdl`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerSasPermissions {
    /// Read blobs in the container (`r`).
    pub read: bool,
    /// Add blocks to append blobs (`a`).
    pub add: bool,
    /// Write new blobs (`c`).
    pub create: bool,
    /// Write blob content and metadata (`w`).
    pub write: bool,
    /// Delete blobs (`d`).
    pub delete: bool,
    /// List blobs in the container (`l`).
    pub list: bool,
}

impl fmt::Display for ContainerSasPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.read {
            f.write_str("r")?;
        }
        if self.add {
            f.write_str("a")?;
        }
        if self.create {
            f.write_str("c")?;
        }
        if self.write {
            f.write_str("w")?;
        }
        if self.delete {
            f.write_str("d")?;
        }
        if self.list {
            f.write_str("l")?;
        }
        Ok(())
    }
}

impl FromStr for ContainerSasPermissions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut p = Self::default();
        for c in s.chars() {
            match c {
                'r' => p.read = true,
                'a' => p.add = true,
                'c' => p.create = true,
                'w' => p.write = true,
                'd' => p.delete = true,
                'l' => p.list = true,
                _ => return Err(invalid_permission(c)),
            }
        }
        Ok(p)
    }
}

/// Permissions grantable by a file SAS. Encodes as `rcwd`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileSasPermissions {
    /// Read the file (`r`).
    pub read: bool,
    /// Create a new file (`c`).
    pub create: bool,
    /// Write content, properties and metadata (`w`).
    pub write: bool,
    /// Delete the file (`d`).
    pub delete: bool,
}

impl fmt::Display for FileSasPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.read {
            f.write_str("r")?;
        }
        if self.create {
            f.write_str("c")?;
        }
        if self.write {
            f.write_str("w")?;
        }
        if self.delete {
            f.write_str("d")?;
        }
        Ok(())
    }
}

impl FromStr for FileSasPermissions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut p = Self::default();
        for c in s.chars() {
            match c {
                'r' => p.read = true,
                'c' => p.create = true,
                'w' => p.write = true,
                'd' => p.delete = true,
                _ => return Err(invalid_permission(c)),
            }
        }
        Ok(p)
    }
}

/// Permissions grantable by a share SAS. Encodes as `rcwdl`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShareSasPermissions {
    /// Read files in the share (`r`).
    pub read: bool,
    /// Create new files (`c`).
    pub create: bool,
    /// Write file content and metadata (`w`).
    pub write: bool,
    /// Delete files (`d`).
    pub delete: bool,
    /// List files and directories (`l`).
    pub list: bool,
}

impl fmt::Display for ShareSasPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.read {
            f.write_str("r")?;
        }
        if self.create {
            f.write_str("c")?;
        }
        if self.write {
            f.write_str("w")?;
        }
        if self.delete {
            f.write_str("d")?;
        }
        if self.list {
            f.write_str("l")?;
        }
        Ok(())
    }
}

impl FromStr for ShareSasPermissions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut p = Self::default();
        for c in s.chars() {
            match c {
                'r' => p.read = true,
                'c' => p.create = true,
                'w' => p.write = true,
                'd' => p.delete = true,
                'l' => p.list = true,
                _ => return Err(invalid_permission(c)),
            }
        }
        Ok(p)
    }
}

/// Permissions grantable by an account SAS. Encodes as `rwdlacup`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountSasPermissions {
    /// Read resources (`r`).
    pub read: bool,
    /// Write resources (`w`).
    pub write: bool,
    /// Delete resources (`d`).
    pub delete: bool,
    /// List resources (`l`).
    pub list: bool,
    /// Add messages, blocks or append data (`a`).
    pub add: bool,
    /// Create new resources (`c`).
    pub create: bool,
    /// Update queue messages (`u`).
    pub update: bool,
    /// Get and delete queue messages (`p`).
    pub process_messages: bool,
}

impl fmt::Display for AccountSasPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.read {
            f.write_str("r")?;
        }
        if self.write {
            f.write_str("w")?;
        }
        if self.delete {
            f.write_str("d")?;
        }
        if self.list {
            f.write_str("l")?;
        }
        if self.add {
            f.write_str("a")?;
        }
        if self.create {
            f.write_str("c")?;
        }
        if self.update {
            f.write_str("u")?;
        }
        if self.process_messages {
            f.write_str("p")?;
        }
        Ok(())
    }
}

impl FromStr for AccountSasPermissions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut p = Self::default();
        for c in s.chars() {
            match c {
                'r' => p.read = true,
                'w' => p.write = true,
                'd' => p.delete = true,
                'l' => p.list = true,
                'a' => p.add = true,
                'c' => p.create = true,
                'u' => p.update = true,
                'p' => p.process_messages = true,
                _ => return Err(invalid_permission(c)),
            }
        }
        Ok(p)
    }
}

/// Services an account SAS applies to (`ss`). Encodes as `bqtf`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountSasServices {
    /// Blob service (`b`).
    pub blob: bool,
    /// Queue service (`q`).
    pub queue: bool,
    /// Table service (`t`).
    pub table: bool,
    /// File service (`f`).
    pub file: bool,
}

impl fmt::Display for AccountSasServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.blob {
            f.write_str("b")?;
        }
        if self.queue {
            f.write_str("q")?;
        }
        if self.table {
            f.write_str("t")?;
        }
        if self.file {
            f.write_str("f")?;
        }
        Ok(())
    }
}

impl FromStr for AccountSasServices {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut p = Self::default();
        for c in s.chars() {
            match c {
                'b' => p.blob = true,
                'q' => p.queue = true,
                't' => p.table = true,
                'f' => p.file = true,
                _ => return Err(invalid_permission(c)),
            }
        }
        Ok(p)
    }
}

/// Resource types an account SAS applies to (`srt`). Encodes as `sco`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountSasResourceTypes {
    /// Service-level APIs, e.g. list containers (`s`).
    pub service: bool,
    /// Container-level APIs (`c`).
    pub container: bool,
    /// Object-level APIs, e.g. blob operations (`o`).
    pub object: bool,
}

impl fmt::Display for AccountSasResourceTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.service {
            f.write_str("s")?;
        }
        if self.container {
            f.write_str("c")?;
        }
        if self.object {
            f.write_str("o")?;
        }
        Ok(())
    }
}

impl FromStr for AccountSasResourceTypes {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut p = Self::default();
        for c in s.chars() {
            match c {
                's' => p.service = true,
                'c' => p.container = true,
                'o' => p.object = true,
                _ => return Err(invalid_permission(c)),
            }
        }
        Ok(p)
    }
}

fn invalid_permission(c: char) -> Error {
    Error::request_invalid(format!("invalid permission character: {c}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_blob_encode_order_is_fixed() {
        let all = BlobSasPermissions {
            read: true,
            add: true,
            create: true,
            write: true,
            delete: true,
        };
        assert_eq!(all.to_string(), "racwd");

        let some = BlobSasPermissions {
            delete: true,
            read: true,
            ..Default::default()
        };
        assert_eq!(some.to_string(), "rd");
    }

    #[test]
    fn test_container_adds_list() {
        let all = ContainerSasPermissions {
            read: true,
            add: true,
            create: true,
            write: true,
            delete: true,
            list: true,
        };
        assert_eq!(all.to_string(), "racwdl");
    }

    #[test]
    fn test_file_and_share_encode_orders() {
        let file = FileSasPermissions {
            read: true,
            create: true,
            write: true,
            delete: true,
        };
        assert_eq!(file.to_string(), "rcwd");

        let share = ShareSasPermissions {
            read: true,
            create: true,
            write: true,
            delete: true,
            list: true,
        };
        assert_eq!(share.to_string(), "rcwdl");
    }

    #[test]
    fn test_account_encode_orders() {
        let perms = AccountSasPermissions {
            read: true,
            write: true,
            delete: true,
            list: true,
            add: true,
            create: true,
            update: true,
            process_messages: true,
        };
        assert_eq!(perms.to_string(), "rwdlacup");

        let services = AccountSasServices {
            blob: true,
            queue: true,
            table: true,
            file: true,
        };
        assert_eq!(services.to_string(), "bqtf");

        let resource_types = AccountSasResourceTypes {
            service: true,
            container: true,
            object: true,
        };
        assert_eq!(resource_types.to_string(), "sco");
    }

    // Parsing is order-insensitive: any permutation re-encodes canonically.
    #[test_case("dwcar", "racwd")]
    #[test_case("rd", "rd")]
    #[test_case("", "")]
    fn test_blob_parse_ignores_order(input: &str, canonical: &str) {
        let p: BlobSasPermissions = input.parse().unwrap();
        assert_eq!(p.to_string(), canonical);
    }

    #[test]
    fn test_parse_round_trip_is_set_equality() {
        let p = ContainerSasPermissions {
            read: true,
            delete: true,
            list: true,
            ..Default::default()
        };
        assert_eq!(p.to_string().parse::<ContainerSasPermissions>().unwrap(), p);
    }

    #[test_case("rwaq"; "unknown character q")]
    #[test_case("x"; "unknown character x")]
    fn test_blob_parse_rejects_unknown(input: &str) {
        let err = input.parse::<BlobSasPermissions>().unwrap_err();
        assert!(err.to_string().contains("invalid permission character"));
    }

    #[test]
    fn test_file_parse_rejects_add() {
        // 'a' is valid for blobs but not files.
        assert!("ra".parse::<FileSasPermissions>().is_err());
        assert!("rwaq".parse::<AccountSasPermissions>().is_err());
    }
}
