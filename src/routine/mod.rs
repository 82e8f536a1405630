pub mod gate;
pub mod recurrence;
pub mod routine;
pub mod store;
pub mod validate;

pub use gate::{can_mutate, ensure_mutable, MutationPolicy};
pub use recurrence::{occurrence_days, occurs_on, resolve_occurrences};
pub use routine::{Collection, Frequency, Routine, RoutineFields, RoutineId, RoutineTime};
pub use store::{decode_collection, encode_collection, JsonFileStore, MemoryStore, RoutineStore};
pub use validate::{validate, RoutineDraft};
