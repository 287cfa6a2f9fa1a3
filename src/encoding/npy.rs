//! Self-describing integer array blocks in NumPy `.npy` v1.0 layout.
//!
//! Each block is byte-identical to what `numpy.save` writes for a C-ordered
//! `int64` array, so a reader needs no schema beyond the block itself.

use std::io::{self, Read, Write};

/// Magic prefix of every block.
pub const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Format version (major, minor).
pub const NPY_VERSION: [u8; 2] = [1, 0];

/// Element type: little-endian signed 64-bit.
pub const NPY_DESCR: &str = "<i8";

/// Magic, version and header length are padded to this boundary.
const ARRAY_ALIGN: usize = 64;

/// Spaces reserved so the first axis can grow in place.
const GROWTH_AXIS_MAX_DIGITS: usize = 21;

/// Magic(6) + Version(2) + HeaderLen(2)
const PREFIX_LEN: usize = 10;

/// An n-dimensional `i64` array in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayBlock {
    pub shape: Vec<usize>,
    pub data: Vec<i64>,
}

impl ArrayBlock {
    /// One-dimensional array.
    pub fn vector(data: Vec<i64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Two-dimensional array. `data.len()` must equal `rows * cols`.
    pub fn matrix(rows: usize, cols: usize, data: Vec<i64>) -> Self {
        debug_assert_eq!(rows * cols, data.len());
        Self {
            shape: vec![rows, cols],
            data,
        }
    }

    /// Python tuple repr of the shape: `()`, `(9,)`, `(9, 9)`.
    fn shape_repr(&self) -> String {
        match self.shape.as_slice() {
            [] => "()".to_string(),
            [n] => format!("({},)", n),
            dims => {
                let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                format!("({})", parts.join(", "))
            }
        }
    }

    /// Header dictionary including alignment padding and trailing newline.
    fn header_text(&self) -> String {
        let mut header = format!(
            "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
            NPY_DESCR,
            self.shape_repr()
        );
        if let Some(first) = self.shape.first() {
            let growth = GROWTH_AXIS_MAX_DIGITS.saturating_sub(first.to_string().len());
            header.push_str(&" ".repeat(growth));
        }
        let hlen = header.len() + 1;
        let padlen = ARRAY_ALIGN - ((PREFIX_LEN + hlen) % ARRAY_ALIGN);
        header.push_str(&" ".repeat(padlen));
        header.push('\n');
        header
    }

    /// Total encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        PREFIX_LEN + self.header_text().len() + self.data.len() * 8
    }

    /// Write block to output.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let header = self.header_text();
        let hlen = u16::try_from(header.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "npy header exceeds 65535 bytes")
        })?;

        w.write_all(NPY_MAGIC)?;
        w.write_all(&NPY_VERSION)?;
        w.write_all(&hlen.to_le_bytes())?;
        w.write_all(header.as_bytes())?;
        for v in &self.data {
            w.write_all(&v.to_le_bytes())?;
        }
        Ok(())
    }

    /// Read block from input.
    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 6];
        r.read_exact(&mut magic)?;
        if &magic != NPY_MAGIC {
            return Err(invalid("Invalid npy magic bytes"));
        }

        let mut version = [0u8; 2];
        r.read_exact(&mut version)?;
        if version != NPY_VERSION {
            return Err(invalid(format!(
                "Unsupported npy version: {}.{}",
                version[0], version[1]
            )));
        }

        let mut buf2 = [0u8; 2];
        r.read_exact(&mut buf2)?;
        let hlen = u16::from_le_bytes(buf2) as usize;

        let mut header = vec![0u8; hlen];
        r.read_exact(&mut header)?;
        let header = String::from_utf8(header)
            .map_err(|_| invalid("npy header is not valid text"))?;

        let descr = dict_value(&header, "descr")?;
        if descr.trim_matches('\'') != NPY_DESCR {
            return Err(invalid(format!("Unsupported npy dtype: {}", descr)));
        }
        if dict_value(&header, "fortran_order")? != "False" {
            return Err(invalid("Fortran-ordered npy arrays are not supported"));
        }
        let shape = parse_shape(&header)?;

        let byte_len = shape
            .iter()
            .try_fold(8usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| invalid(format!("npy shape {:?} is too large", shape)))?;

        // Grows with the bytes actually present, not the declared shape.
        let mut bytes = Vec::new();
        r.by_ref().take(byte_len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != byte_len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("npy data holds {} of {} bytes", bytes.len(), byte_len),
            ));
        }
        let data = bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut buf8 = [0u8; 8];
                buf8.copy_from_slice(chunk);
                i64::from_le_bytes(buf8)
            })
            .collect();

        Ok(Self { shape, data })
    }
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Raw text of a scalar entry in the header dictionary.
fn dict_value<'a>(header: &'a str, key: &str) -> io::Result<&'a str> {
    let pattern = format!("'{}':", key);
    let start = header
        .find(&pattern)
        .ok_or_else(|| invalid(format!("npy header missing '{}'", key)))?
        + pattern.len();
    let rest = header[start..].trim_start();
    let end = rest.find([',', '}']).unwrap_or(rest.len());
    Ok(rest[..end].trim())
}

fn parse_shape(header: &str) -> io::Result<Vec<usize>> {
    let start = header
        .find("'shape':")
        .ok_or_else(|| invalid("npy header missing 'shape'"))?;
    let rest = &header[start..];
    let open = rest
        .find('(')
        .ok_or_else(|| invalid("npy shape is not a tuple"))?;
    let close = rest
        .find(')')
        .ok_or_else(|| invalid("npy shape is not a tuple"))?;
    rest[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| invalid(format!("Invalid npy dimension: {}", s)))
        })
        .collect()
}
