//! 组合层单元测试
