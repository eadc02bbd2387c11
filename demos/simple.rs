use flywheel_stroke::StrokeStateMachine;

const DRIVE_PULSES: usize = 12;
const RECOVERY_PULSES: usize = 24;

fn main() {
    let mut machine = StrokeStateMachine::new();

    for _ in 0..5 {
        // replace these with the intervals measured between flywheel sensor pulses
        let drive = (0..DRIVE_PULSES).map(|i| 0.040 - 0.001 * i as f32);
        let recovery = (0..RECOVERY_PULSES).map(|i| 0.029 + 0.0005 * i as f32);

        for interval in drive.chain(recovery) {
            match machine.on_pulse(interval) {
                Ok(update) => {
                    if let Some(cue) = update.transition.and_then(|t| t.cue()) {
                        println!(
                            "-- drive -- cadence {:.1} spm, mean stroke {:.2} s",
                            cue.cadence, cue.mean_stroke_time
                        );
                    }
                }
                Err(error) => eprintln!("dropped pulse: {}", error),
            }

            print!("{}", machine.telemetry_frame());
        }
    }
}
