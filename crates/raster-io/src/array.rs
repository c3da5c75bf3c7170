//! In-memory chip arrays.

use chip_common::AffineTransform;

use crate::error::{RasterError, RasterResult};

/// Element type of a chip array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl SampleType {
    /// Size of one sample in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    pub fn bits(&self) -> u16 {
        (self.size() * 8) as u16
    }

    /// TIFF SampleFormat value: 1 = unsigned, 2 = signed, 3 = IEEE float.
    pub fn tiff_sample_format(&self) -> u16 {
        match self {
            Self::U8 | Self::U16 | Self::U32 => 1,
            Self::I8 | Self::I16 | Self::I32 => 2,
            Self::F32 | Self::F64 => 3,
        }
    }

    /// Resolve from TIFF SampleFormat and BitsPerSample.
    pub fn from_tiff(sample_format: u16, bits: u16) -> Option<Self> {
        match (sample_format, bits) {
            (1, 8) => Some(Self::U8),
            (1, 16) => Some(Self::U16),
            (1, 32) => Some(Self::U32),
            (2, 8) => Some(Self::I8),
            (2, 16) => Some(Self::I16),
            (2, 32) => Some(Self::I32),
            (3, 32) => Some(Self::F32),
            (3, 64) => Some(Self::F64),
            _ => None,
        }
    }

    /// NumPy kind character (`u`, `i` or `f`).
    pub fn npy_kind(&self) -> char {
        match self {
            Self::U8 | Self::U16 | Self::U32 => 'u',
            Self::I8 | Self::I16 | Self::I32 => 'i',
            Self::F32 | Self::F64 => 'f',
        }
    }

    /// Resolve from a NumPy kind character and item size.
    pub fn from_npy(kind: char, size: usize) -> Option<Self> {
        match (kind, size) {
            ('u', 1) => Some(Self::U8),
            ('u', 2) => Some(Self::U16),
            ('u', 4) => Some(Self::U32),
            ('i', 1) => Some(Self::I8),
            ('i', 2) => Some(Self::I16),
            ('i', 4) => Some(Self::I32),
            ('f', 4) => Some(Self::F32),
            ('f', 8) => Some(Self::F64),
            _ => None,
        }
    }
}

/// Typed sample storage, row-major.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

macro_rules! each_buffer {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            SampleBuffer::U8($v) => $body,
            SampleBuffer::I8($v) => $body,
            SampleBuffer::U16($v) => $body,
            SampleBuffer::I16($v) => $body,
            SampleBuffer::U32($v) => $body,
            SampleBuffer::I32($v) => $body,
            SampleBuffer::F32($v) => $body,
            SampleBuffer::F64($v) => $body,
        }
    };
}

macro_rules! samples_from_bytes {
    ($bytes:expr, $t:ty, $little_endian:expr) => {{
        const N: usize = std::mem::size_of::<$t>();
        $bytes
            .chunks_exact(N)
            .map(|chunk| {
                let mut raw = [0u8; N];
                raw.copy_from_slice(chunk);
                if $little_endian {
                    <$t>::from_le_bytes(raw)
                } else {
                    <$t>::from_be_bytes(raw)
                }
            })
            .collect::<Vec<$t>>()
    }};
}

impl SampleBuffer {
    pub fn len(&self) -> usize {
        each_buffer!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            Self::U8(_) => SampleType::U8,
            Self::I8(_) => SampleType::I8,
            Self::U16(_) => SampleType::U16,
            Self::I16(_) => SampleType::I16,
            Self::U32(_) => SampleType::U32,
            Self::I32(_) => SampleType::I32,
            Self::F32(_) => SampleType::F32,
            Self::F64(_) => SampleType::F64,
        }
    }

    /// Samples as little-endian bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        each_buffer!(self, v => v.iter().flat_map(|s| s.to_le_bytes()).collect())
    }

    /// Samples as native-endian bytes.
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        each_buffer!(self, v => v.iter().flat_map(|s| s.to_ne_bytes()).collect())
    }

    /// Decode raw bytes. The byte count must be a multiple of the sample size.
    pub fn from_bytes(
        sample_type: SampleType,
        bytes: &[u8],
        little_endian: bool,
    ) -> RasterResult<Self> {
        if bytes.len() % sample_type.size() != 0 {
            return Err(RasterError::invalid_layout(format!(
                "{} bytes is not a whole number of {:?} samples",
                bytes.len(),
                sample_type
            )));
        }
        Ok(match sample_type {
            SampleType::U8 => Self::U8(bytes.to_vec()),
            SampleType::I8 => Self::I8(samples_from_bytes!(bytes, i8, little_endian)),
            SampleType::U16 => Self::U16(samples_from_bytes!(bytes, u16, little_endian)),
            SampleType::I16 => Self::I16(samples_from_bytes!(bytes, i16, little_endian)),
            SampleType::U32 => Self::U32(samples_from_bytes!(bytes, u32, little_endian)),
            SampleType::I32 => Self::I32(samples_from_bytes!(bytes, i32, little_endian)),
            SampleType::F32 => Self::F32(samples_from_bytes!(bytes, f32, little_endian)),
            SampleType::F64 => Self::F64(samples_from_bytes!(bytes, f64, little_endian)),
        })
    }

    /// Convert to u16, clamping out-of-range values. NaN becomes 0.
    pub fn to_u16_saturating(&self) -> Vec<u16> {
        match self {
            Self::U8(v) => v.iter().map(|&s| s as u16).collect(),
            Self::I8(v) => v.iter().map(|&s| s.max(0) as u16).collect(),
            Self::U16(v) => v.clone(),
            Self::I16(v) => v.iter().map(|&s| s.max(0) as u16).collect(),
            Self::U32(v) => v.iter().map(|&s| s.min(u16::MAX as u32) as u16).collect(),
            Self::I32(v) => v.iter().map(|&s| s.clamp(0, u16::MAX as i32) as u16).collect(),
            // float-to-int `as` casts saturate
            Self::F32(v) => v.iter().map(|&s| s as u16).collect(),
            Self::F64(v) => v.iter().map(|&s| s as u16).collect(),
        }
    }
}

/// Where a raster sits on the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoReference {
    pub transform: AffineTransform,
    pub epsg: Option<u16>,
}

/// An n-dimensional chip array.
///
/// Raster arrays are laid out `[height, width, bands]` (pixel-interleaved);
/// a 2-D array is a single-band raster.
#[derive(Debug, Clone, PartialEq)]
pub struct ChipArray {
    pub shape: Vec<usize>,
    pub data: SampleBuffer,
    /// Per-band names, empty when unknown.
    pub band_names: Vec<String>,
    pub georef: Option<GeoReference>,
}

impl ChipArray {
    /// Create an array, checking the sample count against the shape.
    pub fn new(shape: Vec<usize>, data: SampleBuffer) -> RasterResult<Self> {
        // an overflowing shape can never match a real buffer
        let expected = shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim));
        if expected != Some(data.len()) {
            return Err(RasterError::ShapeMismatch {
                shape,
                len: data.len(),
            });
        }
        Ok(Self {
            shape,
            data,
            band_names: Vec::new(),
            georef: None,
        })
    }

    pub fn with_band_names(mut self, names: Vec<String>) -> Self {
        self.band_names = names;
        self
    }

    pub fn with_georef(mut self, georef: GeoReference) -> Self {
        self.georef = Some(georef);
        self
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn sample_type(&self) -> SampleType {
        self.data.sample_type()
    }

    /// `(height, width, bands)` for 2-D or 3-D arrays.
    pub fn raster_dims(&self) -> RasterResult<(usize, usize, usize)> {
        match self.shape.as_slice() {
            [h, w] => Ok((*h, *w, 1)),
            [h, w, b] => Ok((*h, *w, *b)),
            other => Err(RasterError::invalid_layout(format!(
                "expected [height, width] or [height, width, bands], got {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch() {
        let err = ChipArray::new(vec![2, 3], SampleBuffer::U16(vec![0; 5])).unwrap_err();
        assert!(matches!(err, RasterError::ShapeMismatch { len: 5, .. }));
    }

    #[test]
    fn test_overflowing_shape_is_mismatch() {
        let err = ChipArray::new(vec![usize::MAX, 2, 3], SampleBuffer::U8(vec![0; 6])).unwrap_err();
        assert!(matches!(err, RasterError::ShapeMismatch { len: 6, .. }));
    }

    #[test]
    fn test_raster_dims() {
        let a = ChipArray::new(vec![2, 3], SampleBuffer::U8(vec![0; 6])).unwrap();
        assert_eq!(a.raster_dims().unwrap(), (2, 3, 1));

        let b = ChipArray::new(vec![2, 3, 4], SampleBuffer::U8(vec![0; 24])).unwrap();
        assert_eq!(b.raster_dims().unwrap(), (2, 3, 4));

        let c = ChipArray::new(vec![24], SampleBuffer::U8(vec![0; 24])).unwrap();
        assert!(c.raster_dims().is_err());
    }

    #[test]
    fn test_bytes_roundtrip_endianness() {
        let buf = SampleBuffer::I16(vec![-2, 300, i16::MAX]);
        let le = buf.to_le_bytes();
        assert_eq!(SampleBuffer::from_bytes(SampleType::I16, &le, true).unwrap(), buf);

        let be: Vec<u8> = [-2i16, 300, i16::MAX]
            .iter()
            .flat_map(|s| s.to_be_bytes())
            .collect();
        assert_eq!(SampleBuffer::from_bytes(SampleType::I16, &be, false).unwrap(), buf);
    }

    #[test]
    fn test_from_bytes_rejects_partial_sample() {
        assert!(SampleBuffer::from_bytes(SampleType::F32, &[0u8; 6], true).is_err());
    }

    #[test]
    fn test_to_u16_saturating() {
        assert_eq!(
            SampleBuffer::I32(vec![-5, 10, 70_000]).to_u16_saturating(),
            vec![0, 10, u16::MAX]
        );
        assert_eq!(
            SampleBuffer::F32(vec![f32::NAN, 1.7, 1e9]).to_u16_saturating(),
            vec![0, 1, u16::MAX]
        );
    }

    #[test]
    fn test_sample_type_codes() {
        for t in [
            SampleType::U8,
            SampleType::I8,
            SampleType::U16,
            SampleType::I16,
            SampleType::U32,
            SampleType::I32,
            SampleType::F32,
            SampleType::F64,
        ] {
            assert_eq!(SampleType::from_npy(t.npy_kind(), t.size()), Some(t));
            assert_eq!(SampleType::from_tiff(t.tiff_sample_format(), t.bits()), Some(t));
        }
    }
}
