//! The built-in machines shipped with the crate.

use crate::compiler::compile;
use crate::loader::{MachineFormat, MachineLoader};
use crate::store::MachineRecord;
use crate::types::TuringMachineError;
use tracing::error;

// Embedded machine files: (name, format, content)
const MACHINE_FILES: [(&str, MachineFormat, &str); 3] = [
    (
        "binary-increment",
        MachineFormat::Json,
        include_str!("../machines/binary-increment.json"),
    ),
    (
        "even-a",
        MachineFormat::Json,
        include_str!("../machines/even-a.json"),
    ),
    (
        "encoded-example",
        MachineFormat::Encoding,
        include_str!("../machines/encoded-example.ab"),
    ),
];

lazy_static::lazy_static! {
    /// Every embedded machine that loads, in declaration order.
    pub static ref MACHINES: Vec<MachineRecord> = MACHINE_FILES
        .iter()
        .filter_map(|(name, format, content)| {
            match MachineLoader::load_machine_from_str(content, *format, name) {
                Ok(machine) => Some(machine),
                Err(e) => {
                    error!("Failed to load built-in machine {}: {}", name, e);
                    None
                }
            }
        })
        .collect();
}

/// Summary of a built-in machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineInfo {
    pub index: usize,
    pub name: String,
    pub state_count: usize,
    pub transition_count: usize,
}

/// Read access to the built-in machines.
pub struct MachineLibrary;

impl MachineLibrary {
    /// Get the number of available machines
    pub fn count() -> usize {
        MACHINES.len()
    }

    /// List all machine names
    pub fn names() -> Vec<String> {
        MACHINES.iter().map(|m| m.id.clone()).collect()
    }

    /// Get a machine by its index
    pub fn get_by_index(index: usize) -> Result<MachineRecord, TuringMachineError> {
        MACHINES
            .get(index)
            .cloned()
            .ok_or_else(|| TuringMachineError::NotFound(format!("machine index {}", index)))
    }

    /// Get a machine by its name
    pub fn get_by_name(name: &str) -> Result<MachineRecord, TuringMachineError> {
        MACHINES
            .iter()
            .find(|m| m.id == name)
            .cloned()
            .ok_or_else(|| TuringMachineError::NotFound(name.to_string()))
    }

    /// Get information about a machine by its index
    pub fn info(index: usize) -> Result<MachineInfo, TuringMachineError> {
        let machine = Self::get_by_index(index)?;
        let table = compile(&machine.diagram).table;

        Ok(MachineInfo {
            index,
            name: machine.id,
            state_count: machine.diagram.states.len(),
            transition_count: table.transition_count(),
        })
    }

    /// Search for machines whose name contains `query`, ignoring case
    pub fn search(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        MACHINES
            .iter()
            .enumerate()
            .filter(|(_, m)| m.id.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::machine::TuringMachine;
    use crate::tape::Tape;
    use crate::types::Halt;

    fn run(name: &str, input: &str) -> (Halt, String) {
        let machine = MachineLibrary::get_by_name(name).unwrap();
        let table = compile(&machine.diagram).table;
        let mut machine = TuringMachine::new(table, Tape::with_input(input, 8)).unwrap();

        let halt = machine.run_blocking(1000);
        (halt, machine.tape().to_string())
    }

    #[test]
    fn test_every_embedded_machine_loads() {
        assert_eq!(MachineLibrary::count(), MACHINE_FILES.len());
        assert_eq!(
            MachineLibrary::names(),
            vec!["binary-increment", "even-a", "encoded-example"]
        );
    }

    #[test]
    fn test_all_machines_are_valid() {
        for index in 0..MachineLibrary::count() {
            let machine = MachineLibrary::get_by_index(index).unwrap();
            let compilation = compile(&machine.diagram);

            assert!(compilation.is_clean(), "Machine '{}' drops rules", machine.id);
            assert!(
                analyze(&compilation.table).is_empty(),
                "Machine '{}' is invalid",
                machine.id
            );
        }
    }

    #[test]
    fn test_binary_increment() {
        assert_eq!(run("binary-increment", "_1011"), (Halt::Accepted, "_1100___".to_string()));
        assert_eq!(run("binary-increment", "_11"), (Halt::Accepted, "100_____".to_string()));
    }

    #[test]
    fn test_even_a() {
        assert_eq!(run("even-a", "aaaa").0, Halt::Accepted);
        assert!(matches!(run("even-a", "aaa").0, Halt::Err(_)));
    }

    #[test]
    fn test_encoded_example_accepts() {
        assert_eq!(run("encoded-example", "ab").0, Halt::Accepted);
    }

    #[test]
    fn test_info() {
        let info = MachineLibrary::info(0).unwrap();

        assert_eq!(info.name, "binary-increment");
        assert_eq!(info.state_count, 4);
        assert_eq!(info.transition_count, 7);
    }

    #[test]
    fn test_lookup_errors() {
        assert!(matches!(
            MachineLibrary::get_by_name("missing"),
            Err(TuringMachineError::NotFound(_))
        ));
        assert!(MachineLibrary::get_by_index(99).is_err());
        assert_eq!(MachineLibrary::search("BINARY"), vec![0]);
    }
}
