//! Emprise englobante d'un ensemble de parcelles

use crate::{BoundingBox, Shape};

/// Union des emprises des formes non vides.
///
/// `None` signifie « aucune zone » : aucune requête bâtiment ne doit être lancée.
pub fn union_bounds<'a, I>(shapes: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a Shape>,
{
    shapes
        .into_iter()
        .filter_map(Shape::bounds)
        .reduce(|acc, b| acc.union(&b))
}
