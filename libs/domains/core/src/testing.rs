//! Minimal entity used by this crate's tests.

use uuid::Uuid;
use validator::Validate;

use crate::builder::{Builder, validate_not_nil};
use crate::entity::{DomainEntity, Timestamps};

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct WidgetData {
    #[validate(length(min = 1, message = "Label must not be empty"))]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct Widget {
    #[validate(custom(function = "validate_not_nil"))]
    id: Uuid,
    timestamps: Timestamps,
    #[validate(nested)]
    data: WidgetData,
}

impl Widget {
    pub fn new(label: &str) -> Self {
        Self::with_id(Uuid::new_v4(), label)
    }

    pub fn with_id(id: Uuid, label: &str) -> Self {
        Self {
            id,
            timestamps: Timestamps::new(),
            data: WidgetData {
                label: label.to_string(),
            },
        }
    }

    pub fn label(&self) -> &str {
        &self.data.label
    }
}

impl DomainEntity for Widget {
    type Id = Uuid;
    type Data = WidgetData;

    const TYPE_NAME: &'static str = "Widget";

    fn id(&self) -> Uuid {
        self.id
    }

    fn generate_id() -> Uuid {
        Uuid::now_v7()
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn data(&self) -> &WidgetData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut WidgetData {
        &mut self.data
    }
}

#[derive(Default)]
pub struct WidgetBuilder {
    id: Option<Uuid>,
    label: Option<String>,
}

impl WidgetBuilder {
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

impl Builder for WidgetBuilder {
    type Output = Widget;

    fn do_build(self) -> Widget {
        Widget::with_id(self.id.unwrap_or_default(), &self.label.unwrap_or_default())
    }
}

#[test]
fn test_widget_builder_reports_each_missing_field() {
    let err = WidgetBuilder::default().build().unwrap_err();
    assert_eq!(err.fields().collect::<Vec<_>>(), vec!["id", "label"]);

    let widget = WidgetBuilder::default()
        .with_id(Uuid::new_v4())
        .with_label("gear")
        .build()
        .unwrap();
    assert_eq!(widget.label(), "gear");
    assert!(widget.created_at().is_none());
    assert!(widget.updated_at().is_none());
}
