use crate::occupation::OccupationAttributes;
use crate::taxonomy::Taxonomy;
use crate::wage::WageTable;

/// All reference tables, loaded once and read-only for the whole build.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub taxonomy: Taxonomy,
    pub attributes: OccupationAttributes,
    pub wages: WageTable,
}
