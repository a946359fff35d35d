use shared::domain::{CategoryId, ChannelId, EditMode};
use storage::{Category, NavigatorDocument};

use crate::{session::WizardFlow, ui::ChannelOption, WizardError};

/// Most channels one picker step accepts.
pub const MAX_PICKED_CHANNELS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub id: CategoryId,
    pub name: String,
}

impl From<&Category> for CategoryOption {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
        }
    }
}

pub fn category_options(doc: &NavigatorDocument) -> Vec<CategoryOption> {
    doc.sorted_categories()
        .into_iter()
        .map(CategoryOption::from)
        .collect()
}

/// A picked channel that currently sits in another category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub channel_id: ChannelId,
    pub from_category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteGroup {
    pub category_name: String,
    pub channels: Vec<ChannelId>,
}

/// Every variant carries what its screen needs, so popping back to it
/// re-renders the same snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditStep {
    PickAddChannels {
        channels: Vec<ChannelId>,
    },
    AddMethod {
        channels: Vec<ChannelId>,
    },
    AddExistingCategory {
        channels: Vec<ChannelId>,
        categories: Vec<CategoryOption>,
    },
    AddNewCategoryOrder {
        channels: Vec<ChannelId>,
        category_name: String,
        categories: Vec<CategoryOption>,
    },
    AddConfirm {
        channels: Vec<ChannelId>,
        category_id: CategoryId,
        category_name: String,
        overrides: Vec<Override>,
    },
    AddNewConfirm {
        channels: Vec<ChannelId>,
        category_name: String,
        /// Zero-based slot among the categories.
        position: usize,
        overrides: Vec<Override>,
    },
    DeletePickChannels {
        channels: Vec<ChannelId>,
    },
    DeleteConfirm {
        channels: Vec<ChannelId>,
        groups: Vec<DeleteGroup>,
    },
    OrderPickCategory {
        categories: Vec<CategoryOption>,
    },
    OrderPickChannel {
        category_id: CategoryId,
        category_name: String,
        channels: Vec<ChannelOption>,
    },
    OrderPickPosition {
        category_id: CategoryId,
        category_name: String,
        channel_id: ChannelId,
        channels: Vec<ChannelOption>,
    },
    CategoryOrderPick {
        categories: Vec<CategoryOption>,
    },
    CategoryOrderPosition {
        category_id: CategoryId,
        category_name: String,
        categories: Vec<CategoryOption>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditStepKind {
    PickAddChannels,
    AddMethod,
    AddExistingCategory,
    AddNewCategoryOrder,
    AddConfirm,
    AddNewConfirm,
    DeletePickChannels,
    DeleteConfirm,
    OrderPickCategory,
    OrderPickChannel,
    OrderPickPosition,
    CategoryOrderPick,
    CategoryOrderPosition,
}

impl EditStepKind {
    pub fn mode(self) -> EditMode {
        match self {
            EditStepKind::PickAddChannels
            | EditStepKind::AddMethod
            | EditStepKind::AddExistingCategory
            | EditStepKind::AddNewCategoryOrder
            | EditStepKind::AddConfirm
            | EditStepKind::AddNewConfirm => EditMode::AddChannel,
            EditStepKind::DeletePickChannels | EditStepKind::DeleteConfirm => {
                EditMode::DeleteChannel
            }
            EditStepKind::OrderPickCategory
            | EditStepKind::OrderPickChannel
            | EditStepKind::OrderPickPosition => EditMode::OrderChannel,
            EditStepKind::CategoryOrderPick | EditStepKind::CategoryOrderPosition => {
                EditMode::OrderCategory
            }
        }
    }
}

impl EditStep {
    pub fn kind(&self) -> EditStepKind {
        match self {
            EditStep::PickAddChannels { .. } => EditStepKind::PickAddChannels,
            EditStep::AddMethod { .. } => EditStepKind::AddMethod,
            EditStep::AddExistingCategory { .. } => EditStepKind::AddExistingCategory,
            EditStep::AddNewCategoryOrder { .. } => EditStepKind::AddNewCategoryOrder,
            EditStep::AddConfirm { .. } => EditStepKind::AddConfirm,
            EditStep::AddNewConfirm { .. } => EditStepKind::AddNewConfirm,
            EditStep::DeletePickChannels { .. } => EditStepKind::DeletePickChannels,
            EditStep::DeleteConfirm { .. } => EditStepKind::DeleteConfirm,
            EditStep::OrderPickCategory { .. } => EditStepKind::OrderPickCategory,
            EditStep::OrderPickChannel { .. } => EditStepKind::OrderPickChannel,
            EditStep::OrderPickPosition { .. } => EditStepKind::OrderPickPosition,
            EditStep::CategoryOrderPick { .. } => EditStepKind::CategoryOrderPick,
            EditStep::CategoryOrderPosition { .. } => EditStepKind::CategoryOrderPosition,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EditFlow;

impl WizardFlow for EditFlow {
    type Mode = EditMode;
    type Step = EditStep;

    fn first_step(mode: EditMode) -> EditStep {
        match mode {
            EditMode::AddChannel => EditStep::PickAddChannels {
                channels: Vec::new(),
            },
            EditMode::DeleteChannel => EditStep::DeletePickChannels {
                channels: Vec::new(),
            },
            EditMode::OrderChannel => EditStep::OrderPickCategory {
                categories: Vec::new(),
            },
            EditMode::OrderCategory => EditStep::CategoryOrderPick {
                categories: Vec::new(),
            },
        }
    }

    fn is_legal(mode: EditMode, step: &EditStep) -> bool {
        step.kind().mode() == mode
    }
}

/// A user action decoded from a `naviedit:*` component or modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    AddChannelsSelected(Vec<ChannelId>),
    AddChannelsConfirm,
    MethodExisting,
    MethodNew,
    NewCategoryName(String),
    ExistingCategory(CategoryId),
    NewCategoryOrder(usize),
    AddConfirm { submit: bool },
    AddNewConfirm { submit: bool },
    DeleteSelected(Vec<ChannelId>),
    DeleteConfirmPrompt,
    DeleteSubmit,
    OrderCategory(CategoryId),
    OrderChannel(ChannelId),
    OrderPosition(usize),
    CatOrderCategory(CategoryId),
    CatOrderPosition(usize),
    Back,
    Home,
}

pub const NEW_NAME_MODAL: &str = "naviedit:add:newname";
pub const NEW_NAME_INPUT: &str = "name";

impl EditAction {
    pub fn parse(custom_id: &str, values: &[String]) -> Result<Self, WizardError> {
        let action = match custom_id {
            "naviedit:back" => EditAction::Back,
            "naviedit:home" => EditAction::Home,
            "naviedit:add:channels" => EditAction::AddChannelsSelected(channel_values(values)?),
            "naviedit:add:channels:confirm" => EditAction::AddChannelsConfirm,
            "naviedit:add:method:existing" => EditAction::MethodExisting,
            "naviedit:add:method:new" => EditAction::MethodNew,
            "naviedit:add:existing:category" => {
                EditAction::ExistingCategory(CategoryId::from(first_value(custom_id, values)?))
            }
            "naviedit:add:new:order" => {
                EditAction::NewCategoryOrder(index_value(custom_id, values)?)
            }
            "naviedit:add:confirm:submit" => EditAction::AddConfirm { submit: true },
            "naviedit:add:confirm:cancel" => EditAction::AddConfirm { submit: false },
            "naviedit:add:newconfirm:submit" => EditAction::AddNewConfirm { submit: true },
            "naviedit:add:newconfirm:cancel" => EditAction::AddNewConfirm { submit: false },
            "naviedit:delete:channels" => EditAction::DeleteSelected(channel_values(values)?),
            "naviedit:delete:confirm" => EditAction::DeleteConfirmPrompt,
            "naviedit:delete:submit" => EditAction::DeleteSubmit,
            "naviedit:order:category" => {
                EditAction::OrderCategory(CategoryId::from(first_value(custom_id, values)?))
            }
            "naviedit:order:channel" => EditAction::OrderChannel(
                first_value(custom_id, values)?
                    .parse()
                    .map_err(|_| WizardError::MissingValue(custom_id.to_string()))?,
            ),
            "naviedit:order:position" => EditAction::OrderPosition(index_value(custom_id, values)?),
            "naviedit:catorder:category" => {
                EditAction::CatOrderCategory(CategoryId::from(first_value(custom_id, values)?))
            }
            "naviedit:catorder:position" => {
                EditAction::CatOrderPosition(index_value(custom_id, values)?)
            }
            other => return Err(WizardError::UnknownComponent(other.to_string())),
        };
        Ok(action)
    }

    /// The mode and live step this action is valid for; `None` for
    /// navigation, which is valid anywhere in the session.
    pub fn expected(&self) -> Option<(EditMode, EditStepKind)> {
        let kind = match self {
            EditAction::Back | EditAction::Home => return None,
            EditAction::AddChannelsSelected(_) | EditAction::AddChannelsConfirm => {
                EditStepKind::PickAddChannels
            }
            EditAction::MethodExisting | EditAction::MethodNew | EditAction::NewCategoryName(_) => {
                EditStepKind::AddMethod
            }
            EditAction::ExistingCategory(_) => EditStepKind::AddExistingCategory,
            EditAction::NewCategoryOrder(_) => EditStepKind::AddNewCategoryOrder,
            EditAction::AddConfirm { .. } => EditStepKind::AddConfirm,
            EditAction::AddNewConfirm { .. } => EditStepKind::AddNewConfirm,
            EditAction::DeleteSelected(_) | EditAction::DeleteConfirmPrompt => {
                EditStepKind::DeletePickChannels
            }
            EditAction::DeleteSubmit => EditStepKind::DeleteConfirm,
            EditAction::OrderCategory(_) => EditStepKind::OrderPickCategory,
            EditAction::OrderChannel(_) => EditStepKind::OrderPickChannel,
            EditAction::OrderPosition(_) => EditStepKind::OrderPickPosition,
            EditAction::CatOrderCategory(_) => EditStepKind::CategoryOrderPick,
            EditAction::CatOrderPosition(_) => EditStepKind::CategoryOrderPosition,
        };
        Some((kind.mode(), kind))
    }
}

fn first_value<'a>(custom_id: &str, values: &'a [String]) -> Result<&'a str, WizardError> {
    values
        .first()
        .map(String::as_str)
        .ok_or_else(|| WizardError::MissingValue(custom_id.to_string()))
}

fn index_value(custom_id: &str, values: &[String]) -> Result<usize, WizardError> {
    first_value(custom_id, values)?
        .trim()
        .parse()
        .map_err(|_| WizardError::MissingValue(custom_id.to_string()))
}

/// Parses picker values, keeping the first `MAX_PICKED_CHANNELS` distinct ids.
fn channel_values(values: &[String]) -> Result<Vec<ChannelId>, WizardError> {
    let mut channels = Vec::new();
    for value in values {
        let channel_id: ChannelId = value
            .parse()
            .map_err(|_| WizardError::MissingValue(value.clone()))?;
        if !channels.contains(&channel_id) {
            channels.push(channel_id);
        }
        if channels.len() == MAX_PICKED_CHANNELS {
            break;
        }
    }
    Ok(channels)
}
