/*
 * Responsibility
 * - middleware public interface
 */
pub mod http;
