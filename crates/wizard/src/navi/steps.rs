use serde::{Deserialize, Serialize};
use shared::domain::{CategoryId, ChannelId};

use crate::{edit::CategoryOption, session::WizardFlow, ui::ChannelOption, WizardError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NaviMode {
    Navigate,
}

/// A visible favorite together with its index in the stored list, which can
/// differ when some favorites are hidden from the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleFavorite {
    pub stored_index: usize,
    pub channel: ChannelOption,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NaviStep {
    Home {
        favorites: Vec<ChannelOption>,
    },
    PickCategory {
        categories: Vec<CategoryOption>,
    },
    ChannelList {
        category_id: CategoryId,
        category_name: String,
        channels: Vec<ChannelOption>,
    },
    ChannelPicked {
        category_name: String,
        channel: ChannelOption,
        link: String,
    },
    EditFavorites {
        has_current_channel: bool,
    },
    FavoritePickCategory {
        categories: Vec<CategoryOption>,
    },
    FavoritePickChannel {
        category_id: CategoryId,
        category_name: String,
        channels: Vec<ChannelOption>,
    },
    RemoveFavorite {
        favorites: Vec<VisibleFavorite>,
    },
    ReorderFavorite {
        favorites: Vec<VisibleFavorite>,
        /// Visible index of the favorite being moved, once chosen.
        source_index: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NaviStepKind {
    Home,
    PickCategory,
    ChannelList,
    ChannelPicked,
    EditFavorites,
    FavoritePickCategory,
    FavoritePickChannel,
    RemoveFavorite,
    ReorderSource,
    ReorderTarget,
}

impl NaviStep {
    pub fn kind(&self) -> NaviStepKind {
        match self {
            NaviStep::Home { .. } => NaviStepKind::Home,
            NaviStep::PickCategory { .. } => NaviStepKind::PickCategory,
            NaviStep::ChannelList { .. } => NaviStepKind::ChannelList,
            NaviStep::ChannelPicked { .. } => NaviStepKind::ChannelPicked,
            NaviStep::EditFavorites { .. } => NaviStepKind::EditFavorites,
            NaviStep::FavoritePickCategory { .. } => NaviStepKind::FavoritePickCategory,
            NaviStep::FavoritePickChannel { .. } => NaviStepKind::FavoritePickChannel,
            NaviStep::RemoveFavorite { .. } => NaviStepKind::RemoveFavorite,
            NaviStep::ReorderFavorite {
                source_index: None,
                ..
            } => NaviStepKind::ReorderSource,
            NaviStep::ReorderFavorite {
                source_index: Some(_),
                ..
            } => NaviStepKind::ReorderTarget,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NaviFlow;

impl WizardFlow for NaviFlow {
    type Mode = NaviMode;
    type Step = NaviStep;

    fn first_step(_mode: NaviMode) -> NaviStep {
        NaviStep::Home {
            favorites: Vec::new(),
        }
    }

    fn is_legal(_mode: NaviMode, _step: &NaviStep) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteMenu {
    AddCurrent,
    AddFromCategory,
    Remove,
    Reorder,
}

impl FavoriteMenu {
    pub const ALL: [FavoriteMenu; 4] = [
        FavoriteMenu::AddCurrent,
        FavoriteMenu::AddFromCategory,
        FavoriteMenu::Remove,
        FavoriteMenu::Reorder,
    ];

    pub fn value(self) -> &'static str {
        match self {
            FavoriteMenu::AddCurrent => "ADD_CURRENT",
            FavoriteMenu::AddFromCategory => "ADD_FROM_CATEGORY",
            FavoriteMenu::Remove => "REMOVE",
            FavoriteMenu::Reorder => "REORDER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FavoriteMenu::AddCurrent => "Add this channel",
            FavoriteMenu::AddFromCategory => "Add from a category",
            FavoriteMenu::Remove => "Remove a favorite",
            FavoriteMenu::Reorder => "Reorder favorites",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.value() == value)
    }
}

/// A user action decoded from a `navi:*` component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NaviAction {
    Back,
    Home,
    Browse,
    EditFavorites,
    PickCategory(CategoryId),
    PickChannel(ChannelId),
    FavoritePicked,
    Menu(FavoriteMenu),
    FavoriteCategory(CategoryId),
    FavoriteChannel(ChannelId),
    RemoveFavorite(ChannelId),
    ReorderSource(usize),
    ReorderTarget(usize),
}

impl NaviAction {
    pub fn parse(custom_id: &str, values: &[String]) -> Result<Self, WizardError> {
        let missing = || WizardError::MissingValue(custom_id.to_string());
        let first = || values.first().map(|v| v.trim()).ok_or_else(missing);
        let action = match custom_id {
            "navi:nav:back" => NaviAction::Back,
            "navi:nav:home" => NaviAction::Home,
            "navi:home:go" => NaviAction::Browse,
            "navi:home:edit" => NaviAction::EditFavorites,
            "navi:pickcat" => NaviAction::PickCategory(CategoryId::from(first()?)),
            "navi:chanlist" => NaviAction::PickChannel(first()?.parse().map_err(|_| missing())?),
            "navi:picked:favorite" => NaviAction::FavoritePicked,
            "navi:editfav" => NaviAction::Menu(FavoriteMenu::parse(first()?).ok_or_else(missing)?),
            "navi:favcat" => NaviAction::FavoriteCategory(CategoryId::from(first()?)),
            "navi:favchan" => {
                NaviAction::FavoriteChannel(first()?.parse().map_err(|_| missing())?)
            }
            "navi:removefav" => {
                NaviAction::RemoveFavorite(first()?.parse().map_err(|_| missing())?)
            }
            "navi:reorder:pick" => {
                NaviAction::ReorderSource(first()?.parse().map_err(|_| missing())?)
            }
            "navi:reorder:target" => {
                NaviAction::ReorderTarget(first()?.parse().map_err(|_| missing())?)
            }
            other => return Err(WizardError::UnknownComponent(other.to_string())),
        };
        Ok(action)
    }

    /// The live step this action is valid for; `None` for back/home.
    pub fn expected(&self) -> Option<NaviStepKind> {
        let kind = match self {
            NaviAction::Back | NaviAction::Home => return None,
            NaviAction::Browse | NaviAction::EditFavorites => NaviStepKind::Home,
            NaviAction::PickCategory(_) => NaviStepKind::PickCategory,
            NaviAction::PickChannel(_) => NaviStepKind::ChannelList,
            NaviAction::FavoritePicked => NaviStepKind::ChannelPicked,
            NaviAction::Menu(_) => NaviStepKind::EditFavorites,
            NaviAction::FavoriteCategory(_) => NaviStepKind::FavoritePickCategory,
            NaviAction::FavoriteChannel(_) => NaviStepKind::FavoritePickChannel,
            NaviAction::RemoveFavorite(_) => NaviStepKind::RemoveFavorite,
            NaviAction::ReorderSource(_) => NaviStepKind::ReorderSource,
            NaviAction::ReorderTarget(_) => NaviStepKind::ReorderTarget,
        };
        Some(kind)
    }
}
