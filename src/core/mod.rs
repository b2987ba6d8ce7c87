//! Core functionality: conversion, documents, extraction, export and reading settings

pub mod converter;
pub mod document;
pub mod export;
pub mod extract;
pub mod pdf;
pub mod settings;
