pub mod api;
pub mod catalog;
pub mod routine;
pub mod workout;

pub use api::{
  CreateRoutineRequest, ExerciseTemplatesPage, Routine, RoutineExercise, RoutineFolder, RoutineFoldersPage,
  RoutineSet, RoutinesPage, WorkoutsPage,
};
pub use catalog::ExerciseCatalogEntry;
pub use routine::{PlannedExercise, PlannedRoutine, PlannedSet, ProgressionStrategy};
pub use workout::{SetType, WorkoutExercise, WorkoutRecord, WorkoutSet};
