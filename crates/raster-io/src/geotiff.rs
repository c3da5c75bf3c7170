//! GeoTIFF codec built on the `tiff` crate.
//!
//! Encoding writes a single uncompressed, pixel-interleaved strip with any
//! band count, using the low-level directory API so the band count is not
//! limited to the gray/RGB/RGBA color types. Georeferencing goes into the
//! standard ModelPixelScale / ModelTiepoint / GeoKeyDirectory tags.
//!
//! Decoding reads the profile (dimensions, band count, sample layout and
//! EPSG code) from tags without touching pixel data, or the full image.

use std::io::Cursor;

use chip_common::{is_geographic_crs, AffineTransform};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

use crate::array::{ChipArray, GeoReference, SampleBuffer, SampleType};
use crate::error::{RasterError, RasterResult};

// GeoTIFF tag ids
const MODEL_PIXEL_SCALE_TAG: u16 = 33550;
const MODEL_TIEPOINT_TAG: u16 = 33922;
const GEO_KEY_DIRECTORY_TAG: u16 = 34735;

// GeoKey ids
const GT_MODEL_TYPE_GEO_KEY: u16 = 1024;
const GT_RASTER_TYPE_GEO_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;

// GeoKey values
const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Layout and georeferencing of an encoded raster.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterProfile {
    pub width: u32,
    pub height: u32,
    pub bands: u16,
    pub bits_per_sample: u16,
    /// TIFF SampleFormat (1 = unsigned, 2 = signed, 3 = float)
    pub sample_format: u16,
    /// 1 = pixel-interleaved, 2 = band-planar
    pub planar_configuration: u16,
    pub epsg: Option<u16>,
    pub transform: Option<AffineTransform>,
}

impl RasterProfile {
    /// Sample type, when it is one the crate can hold in memory.
    pub fn sample_type(&self) -> Option<SampleType> {
        SampleType::from_tiff(self.sample_format, self.bits_per_sample)
    }
}

/// Encode a 2-D or `[height, width, bands]` array as a GeoTIFF.
pub fn encode_geotiff(array: &ChipArray) -> RasterResult<Vec<u8>> {
    let (height, width, bands) = array.raster_dims()?;
    if height == 0 || width == 0 || bands == 0 {
        return Err(RasterError::invalid_layout(format!(
            "raster has zero extent: {:?}",
            array.shape
        )));
    }
    let width = u32::try_from(width).map_err(|_| RasterError::invalid_layout("width overflow"))?;
    let height =
        u32::try_from(height).map_err(|_| RasterError::invalid_layout("height overflow"))?;
    let band_count =
        u16::try_from(bands).map_err(|_| RasterError::invalid_layout("too many bands"))?;

    let sample_type = array.sample_type();
    // The encoder writes in host byte order
    let pixels = array.data.to_ne_bytes();
    let strip_bytes = u32::try_from(pixels.len())
        .map_err(|_| RasterError::invalid_layout("raster exceeds 4 GiB"))?;

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut cursor)?;
        let mut dir = encoder.image_directory()?;

        dir.write_tag(Tag::ImageWidth, width)?;
        dir.write_tag(Tag::ImageLength, height)?;
        dir.write_tag(Tag::BitsPerSample, vec![sample_type.bits(); bands].as_slice())?;
        dir.write_tag(Tag::Compression, 1u16)?;
        // BlackIsZero; extra bands are flagged below
        dir.write_tag(Tag::PhotometricInterpretation, 1u16)?;
        dir.write_tag(Tag::SamplesPerPixel, band_count)?;
        dir.write_tag(
            Tag::SampleFormat,
            vec![sample_type.tiff_sample_format(); bands].as_slice(),
        )?;
        dir.write_tag(Tag::PlanarConfiguration, 1u16)?;
        dir.write_tag(Tag::RowsPerStrip, height)?;
        if bands > 1 {
            dir.write_tag(Tag::ExtraSamples, vec![0u16; bands - 1].as_slice())?;
        }

        if let Some(georef) = &array.georef {
            let t = &georef.transform;
            let pixel_scale = [t.scale_x.abs(), t.scale_y.abs(), 0.0];
            dir.write_tag(Tag::Unknown(MODEL_PIXEL_SCALE_TAG), pixel_scale.as_slice())?;
            let tiepoint = [0.0, 0.0, 0.0, t.translate_x, t.translate_y, 0.0];
            dir.write_tag(Tag::Unknown(MODEL_TIEPOINT_TAG), tiepoint.as_slice())?;
            if let Some(epsg) = georef.epsg {
                let keys = geokey_directory(epsg);
                dir.write_tag(Tag::Unknown(GEO_KEY_DIRECTORY_TAG), keys.as_slice())?;
            }
        }

        let offset = dir.write_data(pixels.as_slice())?;
        let offset = u32::try_from(offset)
            .map_err(|_| RasterError::invalid_layout("strip offset exceeds 4 GiB"))?;
        dir.write_tag(Tag::StripOffsets, offset)?;
        dir.write_tag(Tag::StripByteCounts, strip_bytes)?;
        dir.finish()?;
    }

    Ok(cursor.into_inner())
}

fn geokey_directory(epsg: u16) -> Vec<u16> {
    let (model_type, crs_key) = if is_geographic_crs(epsg) {
        (MODEL_TYPE_GEOGRAPHIC, GEOGRAPHIC_TYPE_GEO_KEY)
    } else {
        (MODEL_TYPE_PROJECTED, PROJECTED_CS_TYPE_GEO_KEY)
    };

    // [version, revision, minor, key count, then (key, location, count, value)...]
    vec![
        1, 1, 0, 3,
        GT_MODEL_TYPE_GEO_KEY, 0, 1, model_type,
        GT_RASTER_TYPE_GEO_KEY, 0, 1, RASTER_PIXEL_IS_AREA,
        crs_key, 0, 1, epsg,
    ]
}

/// Pull the EPSG code out of a GeoKey directory.
fn epsg_from_geokeys(keys: &[u16]) -> Option<u16> {
    let count = *keys.get(3)? as usize;
    keys.get(4..4 + count * 4)?
        .chunks_exact(4)
        .find(|entry| {
            (entry[0] == GEOGRAPHIC_TYPE_GEO_KEY || entry[0] == PROJECTED_CS_TYPE_GEO_KEY)
                && entry[1] == 0
        })
        .map(|entry| entry[3])
        // 32767 is "user-defined"
        .filter(|&code| code != 0 && code != 32767)
}

fn open(bytes: &[u8]) -> RasterResult<Decoder<Cursor<&[u8]>>> {
    Ok(Decoder::new(Cursor::new(bytes))?)
}

/// Read the raster profile of an encoded TIFF without decoding pixels.
pub fn read_profile(bytes: &[u8]) -> RasterResult<RasterProfile> {
    let mut decoder = open(bytes)?;
    let (width, height) = decoder.dimensions()?;

    let bands = decoder
        .find_tag_unsigned::<u16>(Tag::SamplesPerPixel)?
        .unwrap_or(1);
    let bits_per_sample = decoder
        .find_tag_unsigned_vec::<u16>(Tag::BitsPerSample)?
        .and_then(|v| v.first().copied())
        .unwrap_or(1);
    let sample_format = decoder
        .find_tag_unsigned_vec::<u16>(Tag::SampleFormat)?
        .and_then(|v| v.first().copied())
        .unwrap_or(1);
    let planar_configuration = decoder
        .find_tag_unsigned::<u16>(Tag::PlanarConfiguration)?
        .unwrap_or(1);

    let epsg = decoder
        .find_tag_unsigned_vec::<u16>(Tag::from_u16_exhaustive(GEO_KEY_DIRECTORY_TAG))?
        .and_then(|keys| epsg_from_geokeys(&keys));

    let pixel_scale = decoder
        .find_tag(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE_TAG))?
        .map(|v| v.into_f64_vec())
        .transpose()?;
    let tiepoint = decoder
        .find_tag(Tag::from_u16_exhaustive(MODEL_TIEPOINT_TAG))?
        .map(|v| v.into_f64_vec())
        .transpose()?;

    let transform = match (pixel_scale, tiepoint) {
        (Some(scale), Some(tie)) if scale.len() >= 2 && tie.len() >= 6 => {
            Some(AffineTransform::from_coefficients([
                scale[0],
                0.0,
                tie[3] - tie[0] * scale[0],
                0.0,
                -scale[1],
                tie[4] + tie[1] * scale[1],
            ]))
        }
        _ => None,
    };

    Ok(RasterProfile {
        width,
        height,
        bands,
        bits_per_sample,
        sample_format,
        planar_configuration,
        epsg,
        transform,
    })
}

/// Decode an encoded TIFF into a `[height, width, bands]` array.
pub fn decode_geotiff(bytes: &[u8]) -> RasterResult<ChipArray> {
    let profile = read_profile(bytes)?;
    if profile.planar_configuration != 1 {
        return Err(RasterError::invalid_layout(
            "band-planar TIFFs cannot be decoded into a pixel-interleaved array",
        ));
    }

    let mut decoder = open(bytes)?;
    let data = match decoder.read_image()? {
        DecodingResult::U8(v) => SampleBuffer::U8(v),
        DecodingResult::I8(v) => SampleBuffer::I8(v),
        DecodingResult::U16(v) => SampleBuffer::U16(v),
        DecodingResult::I16(v) => SampleBuffer::I16(v),
        DecodingResult::U32(v) => SampleBuffer::U32(v),
        DecodingResult::I32(v) => SampleBuffer::I32(v),
        DecodingResult::F32(v) => SampleBuffer::F32(v),
        DecodingResult::F64(v) => SampleBuffer::F64(v),
        _ => {
            return Err(RasterError::UnsupportedDtype(format!(
                "{}-bit samples with format {}",
                profile.bits_per_sample, profile.sample_format
            )))
        }
    };

    let shape = vec![
        profile.height as usize,
        profile.width as usize,
        profile.bands as usize,
    ];
    let mut array = ChipArray::new(shape, data)?;
    if let Some(transform) = profile.transform {
        array = array.with_georef(GeoReference {
            transform,
            epsg: profile.epsg,
        });
    }
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chip_common::Coordinate;

    #[test]
    fn test_geokey_directory_geographic() {
        let keys = geokey_directory(4326);
        assert_eq!(keys[3], 3);
        assert_eq!(&keys[4..8], &[GT_MODEL_TYPE_GEO_KEY, 0, 1, MODEL_TYPE_GEOGRAPHIC]);
        assert_eq!(&keys[12..16], &[GEOGRAPHIC_TYPE_GEO_KEY, 0, 1, 4326]);
        assert_eq!(epsg_from_geokeys(&keys), Some(4326));
    }

    #[test]
    fn test_geokey_directory_projected() {
        let keys = geokey_directory(32617);
        assert_eq!(keys[7], MODEL_TYPE_PROJECTED);
        assert_eq!(keys[12], PROJECTED_CS_TYPE_GEO_KEY);
        assert_eq!(epsg_from_geokeys(&keys), Some(32617));
    }

    #[test]
    fn test_epsg_from_truncated_keys() {
        assert_eq!(epsg_from_geokeys(&[1, 1, 0, 3, 1024, 0, 1]), None);
        assert_eq!(epsg_from_geokeys(&[]), None);
    }

    #[test]
    fn test_profile_of_encoded_raster() {
        let array = ChipArray::new(vec![4, 5, 2], SampleBuffer::U16((0..40).collect()))
            .unwrap()
            .with_georef(GeoReference {
                transform: AffineTransform::axis_aligned(0.5, -0.5, Coordinate::new(10.0, 20.0)),
                epsg: Some(4326),
            });
        let bytes = encode_geotiff(&array).unwrap();
        let profile = read_profile(&bytes).unwrap();

        assert_eq!(profile.width, 5);
        assert_eq!(profile.height, 4);
        assert_eq!(profile.bands, 2);
        assert_eq!(profile.bits_per_sample, 16);
        assert_eq!(profile.sample_type(), Some(SampleType::U16));
        assert_eq!(profile.epsg, Some(4326));

        let t = profile.transform.unwrap();
        assert_eq!(t.translate_x, 10.0);
        assert_eq!(t.translate_y, 20.0);
        assert_eq!(t.scale_x, 0.5);
        assert_eq!(t.scale_y, -0.5);
    }

    #[test]
    fn test_rejects_non_tiff() {
        assert!(read_profile(b"definitely not a tiff").is_err());
    }

    #[test]
    fn test_rejects_zero_extent() {
        let array = ChipArray::new(vec![0, 5], SampleBuffer::U8(vec![])).unwrap();
        assert!(encode_geotiff(&array).is_err());
    }
}
