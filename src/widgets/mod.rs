//! Built-in controllers: Dialog/AlertDialog, Dropdown, Select, Popover,
//! Tooltip, Tabs, Toasts.

pub mod disclosure;
pub mod dropdown;
pub mod modal;
pub mod popover;
pub mod select;
pub mod tabs;
pub mod toast;
pub mod tooltip;

pub use disclosure::Family;
pub use dropdown::DropdownController;
pub use modal::{ModalController, ModalFamily};
pub use popover::PopoverController;
pub use select::SelectController;
pub use tabs::TabsController;
pub use toast::{Toast, ToastBus, ToastRequest, ToastVariant, ToastViewport};
pub use tooltip::TooltipController;
