pub use crate::filter::{
    DebouncedFilter, FilterAction, FilterHandle, FilterOptions, FilterQuery, FilterState,
    SortDirection, SortOrder,
};
pub use crate::form::conditions;
pub use crate::form::{
    ArraySchema, ErrorTree, FieldError, FieldPath, FieldSchema, FormEngine, FormError, FormModel,
    FormOptions, FormResult, ObjectSchema, Schema, SubmitState, ValidationMode,
};
pub use crate::value::{Record, SanitizePolicy, Value};
