//! Tabular Q-learning
//!
//! Each player role keeps its own sparse [`ValueTable`] of (state, action)
//! estimates. Moves are picked ε-greedily by an [`ActionSelector`]; the
//! tables are only written at the end of an episode, when the terminal
//! reward is pushed back through every move the role made:
//!
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
//!
//! ## Usage Example
//!
//! ```
//! use qtictac::q_learning::{ActionSelector, TdParams, ValueTable};
//! use qtictac::tictactoe::GameEnvironment;
//!
//! let mut env = GameEnvironment::new();
//! let state = env.reset();
//! let mut table = ValueTable::new();
//! let mut selector = ActionSelector::with_seed(7);
//!
//! let action = selector
//!     .select(&table, &state, &env.available_actions(), 0.1)
//!     .unwrap();
//! env.step(action).unwrap();
//!
//! table.update(state, action, 1.0, &env.state(), &[], TdParams::new(0.1, 0.9));
//! assert!(table.lookup(&state, action) > 0.0);
//! ```

pub mod policy;
pub mod selector;
pub mod serialization;
pub mod value_table;

pub use policy::TrainedPolicy;
pub use selector::ActionSelector;
pub use serialization::{SavedPolicy, TrainingMetadata, ValueEntry};
pub use value_table::{TdParams, ValueTable};
