pub mod alert;
pub mod color;
pub mod editor;
pub mod help;
pub mod note_list;
pub mod prompt;
pub mod sketch;
pub mod status_bar;
pub mod text_view;
