//! Sketch degree-of-freedom analysis

use super::{Sketch, SketchError};

impl Sketch {
    /// Freedoms of all geometry before constraints
    pub fn total_freedoms(&self) -> u32 {
        self.geometry.iter().map(|g| g.kind.degrees_of_freedom()).sum()
    }

    /// Freedoms removed by all constraints, resolved or not
    pub fn removed_freedoms(&self) -> u32 {
        self.constraints.iter().map(|c| c.kind.removed_freedoms()).sum()
    }

    /// Remaining degrees of freedom, never negative
    pub fn degrees_of_freedom(&self) -> u32 {
        self.total_freedoms().saturating_sub(self.removed_freedoms())
    }

    /// More freedoms removed than the geometry has
    pub fn is_over_constrained(&self) -> bool {
        self.removed_freedoms() > self.total_freedoms()
    }

    /// Fewer constraints than geometry entities
    pub fn is_under_constrained(&self) -> bool {
        !self.geometry.is_empty() && self.constraints.len() < self.geometry.len()
    }

    /// List every constraint reference that does not resolve
    pub fn validate_constraints(&self) -> Result<(), Vec<SketchError>> {
        let known = &self.index;
        let errors: Vec<SketchError> = self
            .constraints
            .iter()
            .enumerate()
            .flat_map(move |(index, constraint)| {
                constraint
                    .referenced_ids()
                    .filter(move |id| !known.contains_key(*id))
                    .map(move |id| SketchError::DanglingReference {
                        index,
                        id: id.to_string(),
                    })
            })
            .collect();

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
