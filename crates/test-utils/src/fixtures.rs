//! Common test fixtures for chip factory tests.
//!
//! This module provides pre-defined image references, chip anchors and
//! projections that mirror real chipping runs.

/// Image references as the remote service names them.
pub mod images {
    /// A public catalog image (land-cover probabilities, ten bands)
    pub const DYNAMIC_WORLD: &str =
        "GOOGLE/DYNAMICWORLD/V1/20220108T160639_20220108T160732_T17SQB";

    /// Band names of [`DYNAMIC_WORLD`], in image order
    pub const DYNAMIC_WORLD_BANDS: [&str; 10] = [
        "water",
        "trees",
        "grass",
        "flooded_vegetation",
        "crops",
        "shrub_and_scrub",
        "built",
        "bare",
        "snow_and_ice",
        "label",
    ];

    /// A private project asset (three-band RGB composite)
    pub const PRIVATE_RGB: &str = "projects/example-project/assets/rgb_composite";

    /// Band names of [`PRIVATE_RGB`]
    pub const PRIVATE_RGB_BANDS: [&str; 3] = ["b1", "b2", "b3"];
}

/// Chip anchors used across tests.
pub mod locations {
    /// Western Gambia
    pub const GAMBIA: (f64, f64) = (-16.70, 13.37);

    /// North Carolina piedmont
    pub const PIEDMONT: (f64, f64) = (-81.2, 35.1);

    /// Origin of the geographic grid
    pub const ORIGIN: (f64, f64) = (0.0, 0.0);
}

/// Projections as resolved at a scale, `(crs, transform)`.
pub mod projections {
    /// Degrees per meter at the equator for EPSG:4326
    pub const DEGREES_PER_METER: f64 = 1.0 / 111_319.490_793_273_57;

    /// EPSG:4326 at 10 m
    pub const WGS84_10M: (&str, [f64; 6]) = (
        "EPSG:4326",
        [
            10.0 * DEGREES_PER_METER,
            0.0,
            0.0,
            0.0,
            10.0 * DEGREES_PER_METER,
            0.0,
        ],
    );

    /// UTM zone 17N at 30 m
    pub const UTM17N_30M: (&str, [f64; 6]) = ("EPSG:32617", [30.0, 0.0, 0.0, 0.0, 30.0, 0.0]);
}

/// Standard chip dimensions.
pub mod chips {
    /// Default chip edge in pixels
    pub const DEFAULT_SIZE: u32 = 256;

    /// Small chip edge for fast tests
    pub const SMALL_SIZE: u32 = 8;
}
