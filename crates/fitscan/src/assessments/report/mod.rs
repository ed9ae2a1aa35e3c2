mod printable;
pub mod views;

pub use printable::{render_printable, render_text, PrintableReport, ReportError};
pub use views::{PatientDetails, PatientDetailsError, ResultView};
