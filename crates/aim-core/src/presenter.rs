//! Annotation list presenter.
//!
//! The presenter turns an [`AuthoringSession`] into display rows and pushes them to an
//! [`AnnotationsListView`]. Views only receive rows; they never own or mutate the session.

use crate::session::{AuthoringSession, EntryState};
use crate::CoreResult;
use aim_template::AnnotationCharacteristic;

/// One display row of the annotation list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationRow {
    pub index: usize,
    pub label: String,
    pub question_type: String,
    pub annotator_confidence: bool,
    pub state: EntryState,
}

/// Front-end side of the annotation list.
pub trait AnnotationsListView {
    /// Replace the whole list.
    fn render(&mut self, rows: &[AnnotationRow]);

    /// Refresh a single row after the characteristic at `row.index` changed.
    fn update(&mut self, row: &AnnotationRow);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AnnotationsListPresenter;

impl AnnotationsListPresenter {
    pub fn new() -> Self {
        Self
    }

    /// Build the rows for every characteristic in the session, in order.
    pub fn rows(&self, session: &AuthoringSession) -> Vec<AnnotationRow> {
        session
            .iter()
            .map(|(index, component, state)| AnnotationRow {
                index,
                label: component
                    .label()
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("Characteristic {}", index + 1)),
                question_type: component.question_type().to_string(),
                annotator_confidence: component.annotator_confidence(),
                state,
            })
            .collect()
    }

    pub fn render(&self, session: &AuthoringSession, view: &mut dyn AnnotationsListView) {
        view.render(&self.rows(session));
    }

    /// Push the current state of one characteristic to the view.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::UnknownCharacteristic`] if `index` is out of range.
    pub fn update(
        &self,
        session: &AuthoringSession,
        index: usize,
        view: &mut dyn AnnotationsListView,
    ) -> CoreResult<()> {
        session.get(index)?;
        if let Some(row) = self.rows(session).into_iter().nth(index) {
            view.update(&row);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aim_template::{ImagingObservationCharacteristic, ValidTerm};

    #[derive(Default)]
    struct RecordingView {
        rendered: Vec<Vec<AnnotationRow>>,
        updated: Vec<AnnotationRow>,
    }

    impl AnnotationsListView for RecordingView {
        fn render(&mut self, rows: &[AnnotationRow]) {
            self.rendered.push(rows.to_vec());
        }

        fn update(&mut self, row: &AnnotationRow) {
            self.updated.push(row.clone());
        }
    }

    fn session() -> AuthoringSession {
        let mut labelled = ImagingObservationCharacteristic::new();
        labelled.set_label(Some("Shape".into()));
        labelled.set_annotator_confidence(true);
        labelled.set_question_type(ValidTerm::new("RID5", "shape", "RadLex"));

        let mut session = AuthoringSession::from_persisted(vec![labelled]);
        session.add(ImagingObservationCharacteristic::new());
        session
    }

    #[test]
    fn render_pushes_one_row_per_characteristic() {
        let session = session();
        let mut view = RecordingView::default();

        AnnotationsListPresenter::new().render(&session, &mut view);

        assert_eq!(view.rendered.len(), 1);
        let rows = &view.rendered[0];
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "Shape");
        assert_eq!(rows[0].question_type, "RadLex:RID5 (shape)");
        assert!(rows[0].annotator_confidence);
        assert_eq!(rows[0].state, EntryState::Persisted);
        assert_eq!(rows[1].label, "Characteristic 2");
        assert_eq!(rows[1].question_type, "<unset>");
        assert_eq!(rows[1].state, EntryState::Draft);
    }

    #[test]
    fn update_pushes_changed_row() {
        let mut session = session();
        let mut view = RecordingView::default();
        let presenter = AnnotationsListPresenter::new();

        session
            .get_mut(1)
            .expect("draft")
            .set_annotator_confidence(true);
        presenter.update(&session, 1, &mut view).expect("update");

        assert_eq!(view.updated.len(), 1);
        assert_eq!(view.updated[0].index, 1);
        assert!(view.updated[0].annotator_confidence);
    }

    #[test]
    fn update_rejects_unknown_index() {
        let session = session();
        let mut view = RecordingView::default();

        let err = AnnotationsListPresenter::new()
            .update(&session, 9, &mut view)
            .expect_err("should reject");
        assert!(matches!(err, crate::CoreError::UnknownCharacteristic(9)));
        assert!(view.updated.is_empty());
    }
}
