pub mod geo;
pub mod meteorite;
pub mod portrait;

pub use geo::{Feature, FeatureCollection, Geometry, PolygonRings, Position, Ring};
pub use meteorite::{
    FoundSpot, LocationShare, Meteorite, NOT_AVAILABLE, ShareStats, SpecimenRow, YearCount,
};
pub use portrait::{
    AgeAtPortrait, AiSummary, FinalizedPortrait, MainEvent, MainEventError, PortraitRecord,
    PortraitYear,
};
