pub mod move_folder;
