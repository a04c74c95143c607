//! Narrowing the class listing down to the classes worth reporting on.

use crate::model::ClassDescriptor;

/// True when the name marks a test class (contains "test" in any case).
#[must_use]
pub fn is_test_class(full_name: &str) -> bool {
    full_name.to_lowercase().contains("test")
}

/// Drop test classes, keeping the listing order intact.
pub fn reportable_classes<I>(classes: I) -> Vec<ClassDescriptor>
where
    I: IntoIterator<Item = ClassDescriptor>,
{
    classes
        .into_iter()
        .filter(|c| !is_test_class(&c.full_name))
        .collect()
}
