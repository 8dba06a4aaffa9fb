use crate::basic_types::sequence_generators::SequenceGenerator;
use crate::basic_types::sequence_generators::SequenceGeneratorType;

/// When the solver restarts: after `base_interval * s_i` conflicts, where `s_i` is the next
/// element of the chosen sequence.
#[derive(Debug, Clone, Copy)]
pub struct RestartOptions {
    pub restarts_enabled: bool,
    pub sequence_generator_type: SequenceGeneratorType,
    /// Conflicts until the first restart; later intervals follow the sequence.
    pub base_interval: u64,
    /// Growth factor of the geometric sequence.
    pub geometric_coef: f64,
}

impl Default for RestartOptions {
    fn default() -> Self {
        RestartOptions {
            restarts_enabled: true,
            sequence_generator_type: SequenceGeneratorType::Geometric,
            base_interval: 100,
            geometric_coef: 1.5,
        }
    }
}

#[derive(Debug)]
pub(crate) struct RestartStrategy {
    restarts_enabled: bool,
    sequence_generator: Box<dyn SequenceGenerator>,
    number_of_conflicts_encountered_since_restart: u64,
    number_of_conflicts_until_restart: u64,
}

impl RestartStrategy {
    pub(crate) fn new(options: RestartOptions) -> RestartStrategy {
        let base_value = options.base_interval.max(1) as i64;
        let mut sequence_generator = options
            .sequence_generator_type
            .create(base_value, options.geometric_coef);
        let number_of_conflicts_until_restart = sequence_generator.next().max(1) as u64;

        RestartStrategy {
            restarts_enabled: options.restarts_enabled,
            sequence_generator,
            number_of_conflicts_encountered_since_restart: 0,
            number_of_conflicts_until_restart,
        }
    }

    pub(crate) fn should_restart(&self) -> bool {
        self.restarts_enabled
            && self.number_of_conflicts_encountered_since_restart
                >= self.number_of_conflicts_until_restart
    }

    pub(crate) fn notify_conflict(&mut self) {
        self.number_of_conflicts_encountered_since_restart += 1;
    }

    pub(crate) fn notify_restart(&mut self) {
        // A sequence that overflows into non-positive values restarts every conflict.
        self.number_of_conflicts_until_restart = self.sequence_generator.next().max(1) as u64;
        self.number_of_conflicts_encountered_since_restart = 0;
    }
}
